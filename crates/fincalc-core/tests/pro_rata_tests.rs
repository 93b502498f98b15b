use fincalc_core::pro_rata::{
    allocate_demands, override_customer_contribution, CostSheet, DemandInput, DemandPosition,
    ProRataInput,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn construction_linked_plan() -> ProRataInput {
    // Total cost 50 lakh incl. 5% tax; loan sized at 80% of it
    let stages = [
        ("Booking", dec!(10)),
        ("Agreement", dec!(10)),
        ("Plinth", dec!(25)),
        ("Slab", dec!(35)),
        ("Possession", dec!(20)),
    ];
    ProRataInput {
        cost: CostSheet {
            base_cost: dec!(4_500_000),
            additional_charges: dec!(261_904.76),
            tax_percent: dec!(5),
        },
        sanctioned_loan: dec!(4_000_000),
        demands: stages
            .iter()
            .map(|(label, pct)| DemandInput {
                label: label.to_string(),
                percent_of_total: *pct,
            })
            .collect(),
    }
}

#[test]
fn test_five_demand_schedule_at_eighty_percent() {
    let out = allocate_demands(&construction_linked_plan()).unwrap();
    let s = &out.result;

    assert_eq!(s.ratio.bank_percent, dec!(80));
    assert_eq!(s.ratio.customer_percent, dec!(20));

    let first = &s.rows[0];
    assert_eq!(first.position, DemandPosition::FirstDemand);
    assert_eq!(first.bank_contribution, Decimal::ZERO);
    assert_eq!(first.customer_contribution, first.amount);

    assert_eq!(s.rows[1].position, DemandPosition::MiddleDemand { pro_rata: false });
    assert_eq!(s.rows[2].position, DemandPosition::MiddleDemand { pro_rata: true });
    assert_eq!(s.rows[4].position, DemandPosition::LastDemand);

    for row in &s.rows {
        assert_eq!(row.bank_contribution + row.customer_contribution, row.amount);
    }
    assert!((s.total_bank + s.total_customer - s.total_cost).abs() <= dec!(0.05));
    assert!(s.total_bank <= s.sanctioned_loan);
}

#[test]
fn test_customer_edit_rebalances_bank_share() {
    let schedule = allocate_demands(&construction_linked_plan()).unwrap().result;
    let slab = &schedule.rows[3];

    let edited = override_customer_contribution(&schedule, 3, slab.amount / dec!(2)).unwrap();
    let row = &edited.rows[3];
    assert_eq!(row.bank_contribution + row.customer_contribution, row.amount);
    assert_eq!(
        edited.total_customer - schedule.total_customer,
        row.customer_contribution - slab.customer_contribution
    );
    assert_eq!(edited.total_amount, schedule.total_amount);
}
