//! Row computation for the Stock screen.
//!
//! [`compute_rows`] is the whole display model: with no branch selected it
//! folds per-branch records into one [`AggregatedStockRow`] per product,
//! otherwise it narrows the records to the chosen branch.

use feruca::{Collator, Tailoring};
use indexmap::IndexMap;
use inventory_gateway::models::{ProductId, StockRecord};
use serde::Serialize;

use crate::filter::BranchFilter;

/// A product's stock summed across every branch that holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedStockRow {
    pub product_id: ProductId,
    pub product_name: String,
    pub total_quantity: u64,
    /// Contributing branch names in encounter order.
    pub branches: Vec<String>,
    pub stock_records: Vec<StockRecord>,
}

/// What the Stock screen renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", content = "rows", rename_all = "snake_case")]
pub enum StockRows {
    Aggregated(Vec<AggregatedStockRow>),
    Branch(Vec<StockRecord>),
}

impl StockRows {
    pub fn len(&self) -> usize {
        match self {
            StockRows::Aggregated(rows) => rows.len(),
            StockRows::Branch(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn compute_rows(records: &[StockRecord], filter: BranchFilter) -> StockRows {
    match filter {
        BranchFilter::All => StockRows::Aggregated(aggregate(records)),
        BranchFilter::Branch(branch) => StockRows::Branch(
            records
                .iter()
                .filter(|record| record.branch == branch)
                .cloned()
                .collect(),
        ),
    }
}

/// Root collation with spaces and punctuation significant.
fn name_collator() -> Collator {
    Collator::new(Tailoring::default(), false, true)
}

fn aggregate(records: &[StockRecord]) -> Vec<AggregatedStockRow> {
    let mut groups: IndexMap<ProductId, AggregatedStockRow> = IndexMap::new();
    for record in records {
        let row = groups
            .entry(record.product)
            .or_insert_with(|| AggregatedStockRow {
                product_id: record.product,
                product_name: record.product_name.clone(),
                total_quantity: 0,
                branches: Vec::new(),
                stock_records: Vec::new(),
            });
        row.total_quantity += u64::from(record.quantity);
        row.branches.push(record.branch_name.clone());
        row.stock_records.push(record.clone());
    }

    let mut rows: Vec<_> = groups.into_values().collect();
    // Stable, so equal names keep encounter order.
    let mut collator = name_collator();
    rows.sort_by(|a, b| collator.collate(a.product_name.as_str(), b.product_name.as_str()));
    rows
}

#[cfg(test)]
mod tests {
    use inventory_gateway::models::{BranchId, StockId};
    use proptest::prelude::*;
    use serde::Serialize;

    use super::*;

    fn record(id: i64, product: i64, name: &str, branch: i64, branch_name: &str, quantity: u32) -> StockRecord {
        StockRecord {
            id: StockId(id),
            branch: BranchId(branch),
            product: ProductId(product),
            quantity,
            branch_name: branch_name.to_string(),
            product_name: name.to_string(),
        }
    }

    fn scenario() -> Vec<StockRecord> {
        vec![
            record(1, 1, "Pen", 1, "B1", 10),
            record(2, 1, "Pen", 2, "B2", 5),
            record(3, 2, "Book", 1, "B1", 2),
        ]
    }

    fn aggregated(rows: StockRows) -> Vec<AggregatedStockRow> {
        match rows {
            StockRows::Aggregated(rows) => rows,
            StockRows::Branch(_) => panic!("expected aggregated rows"),
        }
    }

    #[derive(Serialize)]
    struct Summary<'a> {
        product_name: &'a str,
        total_quantity: u64,
        branches: &'a [String],
    }

    #[test]
    fn aggregates_scenario() {
        let rows = aggregated(compute_rows(&scenario(), BranchFilter::All));
        let summary: Vec<_> = rows
            .iter()
            .map(|row| Summary {
                product_name: &row.product_name,
                total_quantity: row.total_quantity,
                branches: &row.branches,
            })
            .collect();

        insta::assert_json_snapshot!(summary, @r#"
        [
          {
            "product_name": "Book",
            "total_quantity": 2,
            "branches": [
              "B1"
            ]
          },
          {
            "product_name": "Pen",
            "total_quantity": 15,
            "branches": [
              "B1",
              "B2"
            ]
          }
        ]
        "#);
        assert_eq!(rows[1].stock_records.len(), 2);
    }

    #[test]
    fn branch_filter_keeps_order_unaggregated() {
        let records = scenario();
        let rows = compute_rows(&records, BranchFilter::Branch(BranchId(1)));
        assert_eq!(rows, StockRows::Branch(vec![records[0].clone(), records[2].clone()]));

        let none = compute_rows(&records, BranchFilter::Branch(BranchId(9)));
        assert!(none.is_empty());
    }

    #[test]
    fn sorts_by_product_name() {
        let records = vec![
            record(1, 7, "Widget", 1, "A", 5),
            record(2, 8, "Apple", 2, "B", 3),
        ];
        let rows = aggregated(compute_rows(&records, BranchFilter::All));
        let names: Vec<_> = rows.iter().map(|r| (r.product_name.as_str(), r.total_quantity)).collect();
        assert_eq!(names, [("Apple", 3), ("Widget", 5)]);
    }

    #[test]
    fn collation_ignores_case_first() {
        let records = vec![
            record(1, 1, "banana", 1, "A", 1),
            record(2, 2, "Apple", 1, "A", 1),
            record(3, 3, "cherry", 1, "A", 1),
        ];
        let rows = aggregated(compute_rows(&records, BranchFilter::All));
        let names: Vec<_> = rows.iter().map(|r| r.product_name.as_str()).collect();
        assert_eq!(names, ["Apple", "banana", "cherry"]);
    }

    #[test]
    fn spaces_and_hyphens_are_significant() {
        let records = vec![
            record(1, 1, "Iceberg", 1, "A", 1),
            record(2, 2, "Ice cream", 1, "A", 1),
            record(3, 3, "Tee", 1, "A", 1),
            record(4, 4, "T-Shirt", 1, "A", 1),
        ];
        let rows = aggregated(compute_rows(&records, BranchFilter::All));
        let names: Vec<_> = rows.iter().map(|r| r.product_name.as_str()).collect();
        assert_eq!(names, ["Ice cream", "Iceberg", "T-Shirt", "Tee"]);
    }

    #[test]
    fn equal_names_keep_encounter_order() {
        let records = vec![
            record(1, 9, "Pen", 1, "A", 1),
            record(2, 3, "Book", 1, "A", 1),
            record(3, 4, "Pen", 2, "B", 2),
            record(4, 9, "Pen", 2, "B", 3),
        ];
        let rows = aggregated(compute_rows(&records, BranchFilter::All));
        let ids: Vec<_> = rows.iter().map(|r| (r.product_id, r.total_quantity)).collect();
        assert_eq!(
            ids,
            [(ProductId(3), 1), (ProductId(9), 4), (ProductId(4), 2)]
        );
    }

    #[test]
    fn empty_input() {
        assert!(compute_rows(&[], BranchFilter::All).is_empty());
        assert!(compute_rows(&[], BranchFilter::Branch(BranchId(1))).is_empty());
    }

    #[test]
    fn group_name_comes_from_first_record() {
        let records = vec![
            record(1, 1, "Pen", 1, "A", 1),
            record(2, 1, "Pen (old)", 2, "B", 1),
        ];
        let rows = aggregated(compute_rows(&records, BranchFilter::All));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].product_name, "Pen");
    }

    #[test]
    fn duplicate_branch_names_are_kept() {
        let records = vec![
            record(1, 1, "Pen", 1, "Main", 1),
            record(2, 1, "Pen", 1, "Main", 2),
        ];
        let rows = aggregated(compute_rows(&records, BranchFilter::All));
        assert_eq!(rows[0].branches, ["Main", "Main"]);
        assert_eq!(rows[0].total_quantity, 3);
    }

    const NAMES: [&str; 4] = ["Pen", "pen", "Ice cream", "Iceberg"];

    /// Names are drawn independently of product ids, so distinct products
    /// can share a name.
    fn arb_records() -> impl Strategy<Value = Vec<StockRecord>> {
        proptest::collection::vec(
            (1i64..5, 1i64..4, any::<u32>(), 0..NAMES.len()),
            0..20,
        )
        .prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (product, branch, quantity, name))| {
                    let branch_name = format!("B{branch}");
                    record(i as i64, product, NAMES[name], branch, &branch_name, quantity)
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn totals_match_record_sum(records in arb_records()) {
            let expected: u64 = records.iter().map(|r| u64::from(r.quantity)).sum();
            let rows = aggregated(compute_rows(&records, BranchFilter::All));
            prop_assert_eq!(rows.iter().map(|r| r.total_quantity).sum::<u64>(), expected);
            prop_assert_eq!(rows.iter().map(|r| r.stock_records.len()).sum::<usize>(), records.len());
        }

        #[test]
        fn branch_filter_selects_exactly_that_branch(records in arb_records(), branch in 1i64..4) {
            let rows = compute_rows(&records, BranchFilter::Branch(BranchId(branch)));
            let expected = records.iter().filter(|r| r.branch == BranchId(branch)).count();
            prop_assert_eq!(rows.len(), expected);
            if let StockRows::Branch(rows) = rows {
                prop_assert!(rows.iter().all(|r| r.branch == BranchId(branch)));
            } else {
                prop_assert!(false, "expected branch rows");
            }
        }

        #[test]
        fn aggregated_rows_are_sorted(records in arb_records()) {
            let rows = aggregated(compute_rows(&records, BranchFilter::All));
            let mut collator = name_collator();
            for pair in rows.windows(2) {
                prop_assert_ne!(
                    collator.collate(pair[0].product_name.as_str(), pair[1].product_name.as_str()),
                    std::cmp::Ordering::Greater
                );
            }
        }

        #[test]
        fn equal_names_follow_first_appearance(records in arb_records()) {
            let rows = aggregated(compute_rows(&records, BranchFilter::All));
            let first_seen = |id: ProductId| records.iter().position(|r| r.product == id);
            for pair in rows.windows(2) {
                if pair[0].product_name == pair[1].product_name {
                    prop_assert!(first_seen(pair[0].product_id) < first_seen(pair[1].product_id));
                }
            }
        }

        #[test]
        fn deterministic(records in arb_records(), branch in proptest::option::of(1i64..4)) {
            let filter = BranchFilter::from(branch.map(BranchId));
            prop_assert_eq!(compute_rows(&records, filter), compute_rows(&records, filter));
        }
    }
}
