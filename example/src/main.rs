use brine_sbe::CodecError;
use example_app::{decode_car, encode_car};

fn main() -> Result<(), CodecError> {
    let mut bytes = [0u8; 512];
    let length = encode_car(&mut bytes)?;
    println!("encoded {} bytes", length);

    let mut car = decode_car(&bytes[..length]);
    println!("{}", car);

    println!("serial number: {}", car.serial_number());
    println!("model year:    {}", car.model_year());
    println!("available:     {}", car.available()?);
    println!("engine:        {}", car.engine());

    let mut fuel = car.fuel_figures();
    while fuel.has_next() {
        let figure = fuel.next()?;
        println!("  {} mph: {} mpg ({})", figure.speed(), figure.mpg(), figure.usage_description());
    }

    let mut performance = car.performance_figures();
    performance.try_for_each(|figure| {
        let octane = figure.octane_rating();
        let mut acceleration = figure.acceleration();
        acceleration.try_for_each(|sample| {
            println!("  octane {}: 0-{} mph in {}s", octane, sample.mph(), sample.seconds());
            Ok(())
        })
    })?;

    println!("manufacturer:  {}", car.manufacturer());
    println!("model:         {}", car.model());
    println!("activation:    {} bytes", car.activation_code_length());
    Ok(())
}
