/// Selects one of the descriptive attributes a generated field accessor can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaAttribute {
    Epoch,
    TimeUnit,
    SemanticType,
    Presence,
}

/// Anything bound to a region of a buffer.
pub trait Flyweight {
    fn offset(&self) -> usize;
    fn encoded_length(&self) -> usize;
}

/// Surface shared by generated message encoders and decoders.
pub trait MessageFlyweight: Flyweight {
    fn sbe_block_length(&self) -> u64;
    fn sbe_template_id(&self) -> u64;
    fn sbe_schema_id(&self) -> u64;
    fn sbe_schema_version(&self) -> u64;
    fn sbe_semantic_type(&self) -> &'static str;
    fn limit(&self) -> usize;
    fn set_limit(&mut self, limit: usize);
}

pub trait MessageDecoderFlyweight<B>: MessageFlyweight + Sized {
    fn wrap(buffer: B, offset: usize, acting_block_length: usize, acting_version: u64) -> Self;
}

pub trait MessageEncoderFlyweight<B>: MessageFlyweight + Sized {
    fn wrap(buffer: B, offset: usize) -> Self;
}

pub trait CompositeDecoderFlyweight<B>: Flyweight + Sized {
    fn wrap(buffer: B, offset: usize) -> Self;
}

pub trait CompositeEncoderFlyweight<B>: Flyweight + Sized {
    fn wrap(buffer: B, offset: usize) -> Self;
}
