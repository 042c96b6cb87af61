//! Property tests for parameter splitting

use atcgen_codegen::jpf::split_parameters;
use proptest::prelude::*;

fn type_name() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        Just("int".to_string()),
        Just("Integer".to_string()),
        Just("String".to_string()),
    ];
    leaf.prop_recursive(3, 8, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|t| format!("Set<{}>", t)),
            (inner.clone(), inner).prop_map(|(k, v)| format!("Map<{}, {}>", k, v)),
        ]
    })
}

proptest! {
    #[test]
    fn prop_split_matches_declared_parameters(types in prop::collection::vec(type_name(), 1..5)) {
        let header = types
            .iter()
            .enumerate()
            .map(|(i, t)| format!("{} p{}", t, i))
            .collect::<Vec<_>>()
            .join(", ");
        let parts = split_parameters(&header, "f").unwrap();

        prop_assert_eq!(parts.len(), types.len());
        for (i, (part, ty)) in parts.iter().zip(&types).enumerate() {
            prop_assert_eq!(part, &format!("{} p{}", ty, i));
        }
    }
}
