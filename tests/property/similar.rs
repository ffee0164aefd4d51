use micalint::shadow::similar::similar;
use micalint::typeck::types::{MicaType, TypeTable};
use proptest::prelude::*;

fn basic() -> impl Strategy<Value = MicaType> {
    prop_oneof![
        Just(MicaType::Int),
        Just(MicaType::Float),
        Just(MicaType::Bool),
        Just(MicaType::String),
    ]
}

fn ty() -> impl Strategy<Value = MicaType> {
    basic().prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(|t| MicaType::Pointer(Box::new(t))),
            (proptest::collection::vec(inner.clone(), 0..3), inner.clone())
                .prop_map(|(params, ret)| MicaType::Fn(params, Box::new(ret))),
            proptest::collection::vec(("[a-z]{1,4}", inner), 0..3)
                .prop_map(MicaType::Struct),
        ]
    })
}

proptest! {
    #[test]
    fn basics_are_never_similar(x in basic(), y in ty()) {
        let table = TypeTable::default();
        prop_assert!(!similar(&table, &x, &y));
    }

    #[test]
    fn functions_are_never_similar(
        params in proptest::collection::vec(basic(), 0..3),
        ret in basic(),
        y in ty(),
    ) {
        let table = TypeTable::default();
        let f = MicaType::Fn(params, Box::new(ret));
        prop_assert!(!similar(&table, &f, &y));
    }

    #[test]
    fn pointers_never_match_non_pointers(x in ty(), y in ty()) {
        prop_assume!(!matches!(y, MicaType::Pointer(_)));
        let table = TypeTable::default();
        let p = MicaType::Pointer(Box::new(x));
        prop_assert!(!similar(&table, &p, &y));
    }

    #[test]
    fn pointer_wrapping_preserves_similarity(x in ty(), y in ty()) {
        let table = TypeTable::default();
        let px = MicaType::Pointer(Box::new(x.clone()));
        let py = MicaType::Pointer(Box::new(y.clone()));
        prop_assert_eq!(similar(&table, &px, &py), similar(&table, &x, &y));
    }

    #[test]
    fn struct_similarity_is_structural_identity(x in ty(), y in ty()) {
        prop_assume!(matches!(x, MicaType::Struct(_)));
        let table = TypeTable::default();
        prop_assert_eq!(similar(&table, &x, &y), x == y);
    }
}
