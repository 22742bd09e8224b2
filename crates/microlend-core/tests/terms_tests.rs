use microlend_core::terms::calculator::{self, LoanTermsInput, PenaltyInput};
use microlend_core::{LendingError, RateSchedule};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Loan terms
// ===========================================================================

#[test]
fn test_one_week_total_is_principal_plus_rate() {
    for principal in [dec!(1), dec!(50), dec!(250), dec!(1000), dec!(12345.67)] {
        for rate in [dec!(0.10), dec!(0.15), dec!(0.125)] {
            let t = calculator::compute_terms(principal, 7, rate).unwrap();
            assert_eq!(t.total, principal * (Decimal::ONE + rate));
        }
    }
}

#[test]
fn test_interest_scales_linearly_with_tenor() {
    for principal in [dec!(100), dec!(250), dec!(999.99)] {
        let one_week = calculator::compute_terms(principal, 7, dec!(0.15)).unwrap();
        let two_weeks = calculator::compute_terms(principal, 14, dec!(0.15)).unwrap();
        let four_weeks = calculator::compute_terms(principal, 28, dec!(0.15)).unwrap();
        assert_eq!(two_weeks.interest, dec!(2) * one_week.interest);
        assert_eq!(four_weeks.interest, dec!(4) * one_week.interest);
    }
}

#[test]
fn test_known_answer_thousand() {
    let t = calculator::compute_terms(dec!(1000), 7, dec!(0.15)).unwrap();
    assert_eq!(t.interest, dec!(150));
    assert_eq!(t.total, dec!(1150));
    assert_eq!(t.daily_installment.round_dp(2), dec!(164.29));
}

#[test]
fn test_known_answer_sample_loan() {
    let t = calculator::compute_terms(dec!(250), 7, dec!(0.15)).unwrap();
    assert_eq!(t.interest, dec!(37.5));
    assert_eq!(t.total, dec!(287.5));
    assert_eq!(t.daily_installment.round_dp(2), dec!(41.07));
}

#[test]
fn test_installment_times_tenor_is_total() {
    let t = calculator::compute_terms(dec!(700), 14, dec!(0.10)).unwrap();
    assert_eq!(t.daily_installment * dec!(14), t.total);
}

#[test]
fn test_zero_tenor_is_rejected_not_divided() {
    match calculator::compute_terms(dec!(1000), 0, dec!(0.15)) {
        Err(LendingError::InvalidInput { field, .. }) => assert_eq!(field, "tenor_days"),
        other => panic!("expected InvalidInput, got {other:?}"),
    }
}

// ===========================================================================
// Penalties
// ===========================================================================

#[test]
fn test_penalty_zero_within_grace() {
    for days in 0..=7 {
        let p = calculator::compute_penalty(dec!(500), days, dec!(0.05), 7).unwrap();
        assert_eq!(p, Decimal::ZERO, "day {days} should be inside grace");
    }
}

#[test]
fn test_penalty_monotonic_beyond_grace() {
    let mut previous = Decimal::ZERO;
    for days in 0..=60 {
        let p = calculator::compute_penalty(dec!(1196), days, dec!(0.05), 7).unwrap();
        assert!(p >= previous, "penalty decreased at day {days}");
        previous = p;
    }
}

#[test]
fn test_penalty_known_answers() {
    assert_eq!(
        calculator::compute_penalty(dec!(1196), 12, dec!(0.05), 7).unwrap(),
        dec!(299)
    );
    assert_eq!(
        calculator::compute_penalty(dec!(500), 3, dec!(0.05), 7).unwrap(),
        Decimal::ZERO
    );
}

// ===========================================================================
// Envelopes
// ===========================================================================

#[test]
fn test_terms_envelope_from_json() {
    let input: LoanTermsInput = serde_json::from_str(
        r#"{ "principal": "250", "days_overdue": 12 }"#,
    )
    .unwrap();
    let out = calculator::calculate_loan_terms(&input).unwrap();
    assert_eq!(out.result.total, dec!(287.5));
    // 287.5 * 0.05 * 5
    assert_eq!(out.result.penalty_amount, Some(dec!(71.875)));
    assert_eq!(out.result.amount_due_with_penalty, Some(dec!(359.375)));
    assert_eq!(out.methodology, "Simple weekly interest pro-rated by tenor");
}

#[test]
fn test_reduced_weekly_schedule() {
    let input = LoanTermsInput {
        principal: dec!(1000),
        tenor_days: Some(7),
        days_overdue: None,
        rates: RateSchedule::reduced_weekly(),
    };
    let out = calculator::calculate_loan_terms(&input).unwrap();
    assert_eq!(out.result.total, dec!(1100));
}

#[test]
fn test_invalid_schedule_rejected_by_envelope() {
    let mut rates = RateSchedule::standard();
    rates.daily_penalty_rate = dec!(-0.01);
    let err = calculator::assess_penalty(&PenaltyInput {
        amount_due: dec!(100),
        days_overdue: 10,
        rates,
    })
    .unwrap_err();
    assert!(matches!(err, LendingError::InvalidInput { .. }));
}
