//! Property tests for the column codec and whole-file round trips.

use fixed_width_rs::{
    Alignment, Column, ColumnOptions, Decoder, Definition, Generator, SchemaError,
    SectionOptions, Value, record,
};
use proptest::prelude::*;

fn alignment() -> impl Strategy<Value = Alignment> {
    prop_oneof![Just(Alignment::Left), Just(Alignment::Right)]
}

fn column(length: usize, align: Alignment, truncate: bool, padding: char) -> Column {
    Column::new(
        "field",
        length,
        ColumnOptions::new()
            .align(align)
            .truncate(truncate)
            .padding(padding),
    )
}

fn rows_definition() -> Definition {
    let mut definition = Definition::default();
    definition
        .section("rows", SectionOptions::new(), |s| {
            s.column("code", 8, ColumnOptions::new().left())?
                .column("amount", 6, ColumnOptions::new())?
                .spacer(2)?
                .column("city", 5, ColumnOptions::new().left().group("place"))?;
            Ok(())
        })
        .unwrap();
    definition
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn test_encoded_width_is_exact(
        text in "\\PC{0,30}",
        length in 1usize..20,
        align in alignment(),
        truncate in any::<bool>(),
    ) {
        let col = column(length, align, truncate, ' ');
        let width = text.chars().count();
        match col.encode(&Value::from(text.as_str())) {
            Ok(encoded) => {
                prop_assert_eq!(encoded.chars().count(), length);
                prop_assert!(truncate || width <= length);
            }
            Err(SchemaError::FormattedValueTooLong { length: limit, .. }) => {
                prop_assert!(!truncate);
                prop_assert!(width > length);
                prop_assert_eq!(limit, length);
            }
            Err(other) => prop_assert!(false, "unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_truncation_keeps_aligned_end(
        text in "[a-z]{1,30}",
        length in 1usize..30,
        align in alignment(),
    ) {
        let encoded = column(length, align, true, ' ')
            .encode(&Value::from(text.as_str()))
            .unwrap();
        let width = text.chars().count();
        let expected = match align {
            Alignment::Right => {
                let kept: String = text.chars().skip(width.saturating_sub(length)).collect();
                format!("{kept:>length$}")
            }
            Alignment::Left => {
                let kept: String = text.chars().take(length).collect();
                format!("{kept:<length$}")
            }
        };
        prop_assert_eq!(encoded, expected);
    }

    #[test]
    fn test_padding_side_follows_alignment(
        text in "[a-z]{0,10}",
        extra in 0usize..10,
        align in alignment(),
        padding in prop::sample::select(vec![' ', '0', '*', '.']),
    ) {
        let length = text.len() + extra;
        prop_assume!(length > 0);
        let encoded = column(length, align, false, padding)
            .encode(&Value::from(text.as_str()))
            .unwrap();
        let fill: String = std::iter::repeat_n(padding, extra).collect();
        let expected = match align {
            Alignment::Right => format!("{fill}{text}"),
            Alignment::Left => format!("{text}{fill}"),
        };
        prop_assert_eq!(encoded, expected);
    }

    #[test]
    fn test_decode_inverts_generate(
        rows in prop::collection::vec(
            ("[a-z0-9]{0,8}", "[A-Z0-9]{0,6}", "[a-z]{0,5}"),
            1..6,
        ),
    ) {
        let definition = rows_definition();
        let data = record! {
            "rows" => rows
                .iter()
                .map(|(code, amount, city)| {
                    Value::from(record! {
                        "code" => code.as_str(),
                        "amount" => amount.as_str(),
                        "place" => record! { "city" => city.as_str() },
                    })
                })
                .collect::<Vec<Value>>(),
        };

        let text = Generator::new(&definition).generate(&data).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        prop_assert_eq!(lines.len(), rows.len());

        let parsed = Decoder::new(&definition).parse(&lines).unwrap();
        prop_assert_eq!(parsed, data);
    }
}
