#![cfg(test)]

use brine_sbe_compiler::{
    builder::{self, encoding},
    decompose,
    decomposer::{split_fields, split_groups, split_var_data},
    types::{Encoding, PrimitiveType, Token},
};
use proptest::prelude::*;

fn field(i: usize) -> Vec<Token> {
    let name = format!("field{}", i);
    builder::field(&name, i as i32, 0, vec![encoding(&name, i * 4, Encoding::new(PrimitiveType::Int32))])
}

fn group(i: usize, nested_fields: usize) -> Vec<Token> {
    let body = (0..nested_fields).map(field).collect();
    builder::group(&format!("group{}", i), 100 + i as i32, 0, nested_fields * 4, builder::group_size_encoding(), body)
}

fn var_data(i: usize) -> Vec<Token> {
    builder::var_data(&format!("data{}", i), 200 + i as i32, 0, builder::var_data_encoding(None))
}

proptest! {
    /// Fields, groups and var-data come back as three adjacent slices that
    /// cover the body exactly once.
    #[test]
    fn partitions_cover_the_body(
        fields in 0usize..6,
        groups in proptest::collection::vec(0usize..4, 0..4),
        var_data_count in 0usize..4,
    ) {
        let mut body: Vec<Token> = (0..fields).flat_map(field).collect();
        for (i, nested) in groups.iter().enumerate() {
            body.extend(group(i, *nested));
        }
        body.extend((0..var_data_count).flat_map(var_data));

        let decomposition = decompose(&body, 0).unwrap();
        prop_assert_eq!(decomposition.next_index, body.len());

        let rejoined: Vec<Token> = decomposition
            .fields
            .iter()
            .chain(decomposition.groups)
            .chain(decomposition.var_data)
            .cloned()
            .collect();
        prop_assert_eq!(&rejoined, &body);

        prop_assert_eq!(split_fields(decomposition.fields).unwrap().len(), fields);
        let layouts = split_groups(decomposition.groups).unwrap();
        prop_assert_eq!(layouts.len(), groups.len());
        for (layout, nested) in layouts.iter().zip(&groups) {
            prop_assert_eq!(split_fields(layout.body.fields).unwrap().len(), *nested);
            prop_assert_eq!(layout.num_in_group.name.as_str(), "numInGroup");
        }
        prop_assert_eq!(split_var_data(decomposition.var_data).unwrap().len(), var_data_count);
    }
}

#[test]
fn decomposition_stops_at_the_first_out_of_order_token() {
    let mut body = var_data(0);
    body.extend(field(1));

    let decomposition = decompose(&body, 0).unwrap();
    assert!(decomposition.fields.is_empty());
    assert!(decomposition.groups.is_empty());
    assert_eq!(decomposition.var_data.len(), var_data(0).len());
    assert_eq!(decomposition.next_index, var_data(0).len());
}
