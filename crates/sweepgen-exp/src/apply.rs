//! Literal placeholder substitution for single arms and ordered combinations.

use sweepgen_core::{is_placeholder_token, ErrorInfo, SweepError};

use crate::model::{Arm, SweepTable};

/// Resolves `sweep`/`arm` in `sweeps` and applies its substitutions to `document`.
pub fn apply_arm(
    sweeps: &SweepTable,
    document: &str,
    sweep: &str,
    arm: &str,
) -> Result<String, SweepError> {
    let arms = sweeps
        .get(sweep)
        .ok_or_else(|| SweepError::unknown_sweep(sweep))?;
    let substitutions = arms
        .get(arm)
        .ok_or_else(|| SweepError::unknown_arm(sweep, arm))?;
    substitute(document, sweep, arm, substitutions)
}

/// Applies `arms[i]` of `sweeps[i]` to `document` for each position in order.
///
/// Later arms see the text produced by earlier ones, so a value containing
/// another placeholder is replaced if that placeholder's arm comes later.
pub fn apply_combination<S, A>(
    table: &SweepTable,
    document: &str,
    sweeps: &[S],
    arms: &[A],
) -> Result<String, SweepError>
where
    S: AsRef<str>,
    A: AsRef<str>,
{
    if sweeps.len() != arms.len() {
        return Err(SweepError::Input(
            ErrorInfo::new(
                "row-arity",
                format!("{} arms given for {} sweeps", arms.len(), sweeps.len()),
            )
            .with_hint("every pinned sweep needs exactly one arm"),
        ));
    }
    let mut scenario = document.to_owned();
    for (sweep, arm) in sweeps.iter().zip(arms) {
        scenario = apply_arm(table, &scenario, sweep.as_ref(), arm.as_ref())?;
    }
    Ok(scenario)
}

/// Replaces every occurrence of each token of `substitutions` in `document`.
///
/// All keys are checked before any replacement so an invalid arm never
/// produces partial output.
pub(crate) fn substitute(
    document: &str,
    sweep: &str,
    arm: &str,
    substitutions: &Arm,
) -> Result<String, SweepError> {
    if let Some(token) = substitutions
        .keys()
        .find(|token| !is_placeholder_token(token))
    {
        return Err(SweepError::invalid_token(sweep, arm, token));
    }
    let mut scenario = document.to_owned();
    for (token, value) in substitutions {
        if scenario.contains(token.as_str()) {
            scenario = scenario.replace(token.as_str(), &value.render());
        }
    }
    Ok(scenario)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Sweep, SubstitutionValue};

    fn table() -> SweepTable {
        let mut itn = Sweep::new();
        itn.insert(
            "itn80".into(),
            Arm::from([("@itn@".to_string(), SubstitutionValue::from("80 @irs@"))]),
        );
        let mut irs = Sweep::new();
        irs.insert(
            "irs66".into(),
            Arm::from([("@irs@".to_string(), SubstitutionValue::from(66i64))]),
        );
        let mut bad = Sweep::new();
        bad.insert(
            "broken".into(),
            Arm::from([
                ("@ok@".to_string(), SubstitutionValue::from("fine")),
                ("nope".to_string(), SubstitutionValue::from("x")),
            ]),
        );
        SweepTable::from([
            ("itn".to_string(), itn),
            ("irs".to_string(), irs),
            ("bad".to_string(), bad),
        ])
    }

    #[test]
    fn replaces_every_occurrence() {
        let out = apply_arm(&table(), "@irs@-@irs@-@irs", "irs", "irs66").unwrap();
        assert_eq!(out, "66-66-@irs");
    }

    #[test]
    fn later_arms_rewrite_earlier_values() {
        let out = apply_combination(&table(), "<x>@itn@</x>", &["itn", "irs"], &["itn80", "irs66"])
            .unwrap();
        assert_eq!(out, "<x>80 66</x>");
        let reversed =
            apply_combination(&table(), "<x>@itn@</x>", &["irs", "itn"], &["irs66", "itn80"])
                .unwrap();
        assert_eq!(reversed, "<x>80 @irs@</x>");
    }

    #[test]
    fn invalid_key_fails_before_substituting() {
        let err = apply_arm(&table(), "@ok@", "bad", "broken").unwrap_err();
        assert!(matches!(err, SweepError::Token(_)));
        assert_eq!(err.info().context["token"], "nope");
    }

    #[test]
    fn lookups_fail_with_names() {
        let err = apply_arm(&table(), "", "model", "m1").unwrap_err();
        assert_eq!(err.info().code, "unknown-sweep");
        let err = apply_arm(&table(), "", "irs", "irs90").unwrap_err();
        assert_eq!(err.info().code, "unknown-arm");
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let err = apply_combination(&table(), "", &["itn", "irs"], &["itn80"]).unwrap_err();
        assert!(matches!(err, SweepError::Input(_)));
    }

    #[test]
    fn empty_combination_is_identity() {
        let none: [&str; 0] = [];
        assert_eq!(apply_combination(&table(), "@itn@", &none, &none).unwrap(), "@itn@");
    }
}
