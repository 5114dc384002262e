use chrono::{Duration, NaiveDate, NaiveDateTime};
use csv_obfuscate::{
    config::ObfuscatorConfig,
    data::SemanticValue,
    obfuscator::Obfuscator,
    profile::ColumnKind,
    randomness::RecordRandomness,
    sniff::sniff_str,
    transform::{ValueTransformer, rot13, shift_digits, unshift_digits},
};
use proptest::prelude::*;

fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 15)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

fn bundle_strategy() -> impl Strategy<Value = RecordRandomness> {
    (1u8..=9, 1u32..=1000).prop_map(|(digits, days)| RecordRandomness::new(digits, days))
}

fn semantic_strategy() -> impl Strategy<Value = SemanticValue> {
    let leaf = prop_oneof![
        Just(SemanticValue::Null),
        any::<i32>().prop_map(|i| SemanticValue::Integer(i64::from(i))),
        "[a-zA-Z0-9 ]{0,12}".prop_map(SemanticValue::Text),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(SemanticValue::List),
            prop::collection::vec(("[a-z_]{1,8}", inner), 0..6).prop_map(|entries| {
                let mut seen = std::collections::HashSet::new();
                SemanticValue::Mapping(
                    entries
                        .into_iter()
                        .filter(|(key, _)| seen.insert(key.clone()))
                        .collect(),
                )
            }),
        ]
    })
}

/// Collects the key sets of every mapping, depth-first.
fn key_sets(value: &SemanticValue, out: &mut Vec<Vec<String>>) {
    match value {
        SemanticValue::List(items) => items.iter().for_each(|item| key_sets(item, out)),
        SemanticValue::Mapping(entries) => {
            out.push(entries.iter().map(|(k, _)| k.clone()).collect());
            entries.iter().for_each(|(_, item)| key_sets(item, out));
        }
        _ => {}
    }
}

proptest! {
    #[test]
    fn rot13_is_an_involution(input in "\\PC{0,40}") {
        prop_assert_eq!(rot13(&rot13(&input)), input);
    }

    #[test]
    fn digit_shift_is_invertible(input in "[0-9a-z .-]{0,30}", shift in 1u8..=9) {
        prop_assert_eq!(unshift_digits(&shift_digits(&input, shift), shift), input.clone());
        prop_assert_eq!(shift_digits(&input, shift).chars().count(), input.chars().count());
    }

    #[test]
    fn dates_never_cross_now(offset in -20_000i64..20_000, bundle in bundle_strategy()) {
        let transformer = ValueTransformer::with_now(&[], fixed_now());
        let today = fixed_now().date();
        let value = today + Duration::days(offset);
        let shifted = transformer.obfuscate_date(value, &bundle).unwrap();
        let shifted = NaiveDate::parse_from_str(&shifted, "%Y-%m-%d").unwrap();
        if value < today {
            prop_assert!(shifted < today);
        } else {
            prop_assert!(shifted > today);
        }
        prop_assert_eq!((shifted - value).num_days().unsigned_abs(), u64::from(bundle.day_shift));
    }

    #[test]
    fn timestamps_never_cross_now(offset_minutes in -5_000_000i64..5_000_000, bundle in bundle_strategy()) {
        let config = ObfuscatorConfig::default();
        let obfuscator = Obfuscator::with_transformer(
            &config,
            ValueTransformer::with_now(&config.identifier_masks, fixed_now()),
        );
        let value = fixed_now() + Duration::minutes(offset_minutes);
        let raw = value.format("%Y-%m-%d %H:%M:%S").to_string();
        let out = obfuscator
            .obfuscate_cell(&ColumnKind::Timestamp, "ts", Some(raw), &bundle)
            .unwrap()
            .unwrap();
        let shifted = NaiveDate::parse_from_str(&out, "%Y-%m-%d").unwrap();
        if value < fixed_now() {
            prop_assert!(shifted <= fixed_now().date());
        } else {
            prop_assert!(shifted > fixed_now().date());
        }
    }

    #[test]
    fn offset_timestamps_never_cross_now(
        offset_minutes in -5_000_000i64..5_000_000,
        zone in prop::sample::select(vec!["Z", "+00", "+00:00", "-05:00", "+0530"]),
        bundle in bundle_strategy(),
    ) {
        let config = ObfuscatorConfig::default();
        let obfuscator = Obfuscator::with_transformer(
            &config,
            ValueTransformer::with_now(&config.identifier_masks, fixed_now()),
        );
        let value = fixed_now() + Duration::minutes(offset_minutes);
        let raw = format!("{}{zone}", value.format("%Y-%m-%dT%H:%M:%S"));
        let out = obfuscator
            .obfuscate_cell(&ColumnKind::Timestamp, "ts", Some(raw.clone()), &bundle)
            .unwrap()
            .unwrap();
        prop_assert_ne!(&out, &raw);
        let shifted = NaiveDate::parse_from_str(&out, "%Y-%m-%d").unwrap();
        if value < fixed_now() {
            prop_assert!(shifted <= fixed_now().date());
        } else {
            prop_assert!(shifted > fixed_now().date());
        }
    }

    #[test]
    fn mapping_keys_survive_at_every_depth(value in semantic_strategy(), bundle in bundle_strategy()) {
        let config = ObfuscatorConfig::default();
        let transformer = ValueTransformer::with_now(&config.identifier_masks, fixed_now());
        let mut before = Vec::new();
        key_sets(&value, &mut before);
        let out = transformer.transform(value, &bundle, None);
        let mut after = Vec::new();
        key_sets(&out, &mut after);
        prop_assert_eq!(before, after);
    }

    #[test]
    fn null_in_null_out(bundle in bundle_strategy()) {
        let config = ObfuscatorConfig::default();
        let obfuscator = Obfuscator::new(&config);
        for kind in [
            ColumnKind::Int,
            ColumnKind::Varchar,
            ColumnKind::Date,
            ColumnKind::Timestamp,
            ColumnKind::Super,
        ] {
            prop_assert_eq!(obfuscator.obfuscate_cell(&kind, "col", None, &bundle).unwrap(), None);
        }
        let transformer = ValueTransformer::with_now(&[], fixed_now());
        prop_assert_eq!(transformer.transform(SemanticValue::Null, &bundle, Some("mbi")), SemanticValue::Null);
    }

    #[test]
    fn int_and_text_share_one_digit_shift(digits in "[0-9]{1,9}", bundle in bundle_strategy()) {
        let config = ObfuscatorConfig::default();
        let obfuscator = Obfuscator::new(&config);
        let trimmed = digits.trim_start_matches('0');
        let canonical = if trimmed.is_empty() { "0" } else { trimmed };
        let as_int = obfuscator
            .obfuscate_cell(&ColumnKind::Int, "amount", Some(digits.clone()), &bundle)
            .unwrap()
            .unwrap();
        let as_text = obfuscator
            .obfuscate_cell(&ColumnKind::Varchar, "amount", Some(canonical.to_string()), &bundle)
            .unwrap()
            .unwrap();
        prop_assert_eq!(as_int, as_text);
    }

    #[test]
    fn sniffing_plain_words_keeps_text(word in "[a-z]{3,12}") {
        prop_assume!(!matches!(word.as_str(), "null" | "true" | "false"));
        prop_assert_eq!(sniff_str(&word), SemanticValue::Text(word.clone()));
    }
}
