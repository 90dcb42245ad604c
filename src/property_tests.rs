use polars::prelude::*;
use proptest::prelude::*;

use crate::abc::{classify, AbcClass};
use crate::category::{translate_category, CATEGORY_NAMES};
use crate::columns::item_headers;
use crate::config::AnalysisConfig;
use crate::consolidate::{select_view, View};
use crate::loader::{load_branch_frames, BranchSet};
use crate::metrics::{safe_ratio, with_period_derived};
use crate::numeric::{clean_numeric_column, parse_number};
use crate::schema::{abc, item, period};

fn branch_frames(rows: &[(u8, f64, f64)]) -> (DataFrame, DataFrame) {
    let items = DataFrame::new(vec![
        Column::new(
            item::PRODUCT.into(),
            rows.iter().map(|r| format!("p{}", r.0)).collect::<Vec<_>>(),
        ),
        Column::new(item::CATEGORY.into(), vec!["1"; rows.len()]),
        Column::new(item::UNITS.into(), rows.iter().map(|r| r.1).collect::<Vec<_>>()),
        Column::new(item::REVENUE.into(), rows.iter().map(|r| r.2).collect::<Vec<_>>()),
    ])
    .unwrap();
    let periods = DataFrame::new(vec![
        Column::new(period::PERIOD.into(), &["Enero"]),
        Column::new(period::DINING.into(), &[1.0]),
        Column::new(period::COUNTER.into(), &[1.0]),
        Column::new(period::TICKETS.into(), &[1.0]),
    ])
    .unwrap();
    (items, periods)
}

fn revenue_rows() -> impl Strategy<Value = Vec<(u8, f64, f64)>> {
    prop::collection::vec((0u8..20, 1.0f64..50.0, 0.0f64..10_000.0), 1..15)
}

proptest! {
    #[test]
    fn parsed_numbers_are_always_finite(text in ".{0,24}") {
        prop_assert!(parse_number(&text).is_finite());
    }

    #[test]
    fn formatted_amounts_parse_back(cents in 0u64..10_000_000_00) {
        let value = cents as f64 / 100.0;
        let whole = (cents / 100).to_string();
        let mut grouped = String::new();
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        let text = format!("${grouped}.{:02}", cents % 100);
        prop_assert!((parse_number(&text) - value).abs() < 1e-6);

        let df = DataFrame::new(vec![Column::new(item::REVENUE.into(), &[text.as_str()])]).unwrap();
        let cleaned = clean_numeric_column(&df, item::REVENUE).unwrap();
        let from_column = cleaned.column(item::REVENUE).unwrap().f64().unwrap().get(0).unwrap();
        prop_assert_eq!(from_column, parse_number(&text));
    }

    #[test]
    fn known_codes_translate_with_decimal_and_padding(idx in 0usize..27, pad in " {0,3}") {
        let (code, name) = CATEGORY_NAMES[idx];
        prop_assert_eq!(translate_category(&format!("{pad}{code}.0{pad}")), Some(name));
        prop_assert_eq!(translate_category(code), Some(name));
    }

    #[test]
    fn codes_outside_the_table_are_untranslated(n in 28u32..100_000) {
        prop_assert_eq!(translate_category(&n.to_string()), None);
    }

    #[test]
    fn header_normalization_is_idempotent(headers in prop::collection::vec("[A-Za-zÁÉÍÓÚáéíóúñ _]{1,12}", 1..8)) {
        let once = item_headers(&headers);
        let twice = item_headers(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn abc_partitions_every_item(rows in revenue_rows()) {
        let (items, _) = branch_frames(&rows);
        let result = classify(&items, &AnalysisConfig::default()).unwrap();
        prop_assert_eq!(result.ranked.height(), items.height());

        let classes: Vec<String> = result.ranked.column(abc::CLASS).unwrap().str().unwrap()
            .into_iter().map(|v| v.unwrap().to_string()).collect();
        // tiers come in A, B, C order down the ranking
        let order: Vec<usize> = classes.iter().map(|c| match c.as_str() {
            "A" => AbcClass::A as usize,
            "B" => AbcClass::B as usize,
            _ => AbcClass::C as usize,
        }).collect();
        prop_assert!(order.windows(2).all(|w| w[0] <= w[1]));

        let total: f64 = rows.iter().map(|r| r.2).sum();
        let summed: f64 = result.summary.column(crate::schema::abc_summary::REVENUE).unwrap()
            .f64().unwrap().sum().unwrap_or(0.0);
        prop_assert!((summed - total).abs() < 1e-6 * total.max(1.0));
    }

    #[test]
    fn consolidated_revenue_is_the_sum_of_branches(a in revenue_rows(), b in revenue_rows()) {
        let cfg = AnalysisConfig::default();
        let mut set = BranchSet::new();
        for (label, rows) in [("A", &a), ("B", &b)] {
            let (items, periods) = branch_frames(rows);
            set.insert(load_branch_frames(&items, &periods, label, &cfg).unwrap()).unwrap();
        }

        let revenue = |view: View| -> f64 {
            select_view(&set, &view, &cfg).unwrap().items
                .column(item::REVENUE).unwrap().f64().unwrap().sum().unwrap_or(0.0)
        };
        let whole = revenue(View::Consolidated);
        let parts = revenue(View::Branch("A".into())) + revenue(View::Branch("B".into()));
        prop_assert!((whole - parts).abs() < 1e-6 * parts.max(1.0));
    }

    #[test]
    fn guarded_ratios_are_finite(n in any::<f64>(), d in any::<f64>()) {
        prop_assume!(n.is_finite() && d.is_finite());
        prop_assert!(safe_ratio(n, d).is_finite());
    }

    #[test]
    fn period_ratios_are_finite(
        rows in prop::collection::vec((0.0f64..1e6, 0.0f64..1e6, 0.0f64..500.0), 1..10)
    ) {
        let df = DataFrame::new(vec![
            Column::new(period::PERIOD.into(), (0..rows.len()).map(|i| format!("m{i}")).collect::<Vec<_>>()),
            Column::new(period::DINING.into(), rows.iter().map(|r| r.0).collect::<Vec<_>>()),
            Column::new(period::COUNTER.into(), rows.iter().map(|r| r.1).collect::<Vec<_>>()),
            Column::new(period::TICKETS.into(), rows.iter().map(|r| r.2).collect::<Vec<_>>()),
        ]).unwrap();
        let out = with_period_derived(&df).unwrap();
        for name in [period::AVG_TICKET, period::DINING_PCT, period::COUNTER_PCT] {
            let all_finite = out.column(name).unwrap().f64().unwrap().into_iter()
                .all(|v| v.map(f64::is_finite).unwrap_or(false));
            prop_assert!(all_finite, "{} has a non-finite value", name);
        }
    }
}
