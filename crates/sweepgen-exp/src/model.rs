use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;
use sweepgen_core::{ErrorInfo, SweepError};

/// Value substituted for a placeholder token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubstitutionValue {
    Text(String),
    Number(Number),
}

impl SubstitutionValue {
    /// Builds a numeric value from a float; `None` for NaN and infinities.
    pub fn float(value: f64) -> Option<Self> {
        Number::from_f64(value).map(SubstitutionValue::Number)
    }

    /// Text inserted into the document. Numbers use their canonical decimal
    /// form, so integer `2` renders as `2` and never as `2.0`.
    pub fn render(&self) -> Cow<'_, str> {
        match self {
            SubstitutionValue::Text(text) => Cow::Borrowed(text),
            SubstitutionValue::Number(number) => Cow::Owned(number.to_string()),
        }
    }
}

impl From<&str> for SubstitutionValue {
    fn from(value: &str) -> Self {
        SubstitutionValue::Text(value.to_string())
    }
}

impl From<String> for SubstitutionValue {
    fn from(value: String) -> Self {
        SubstitutionValue::Text(value)
    }
}

impl From<i64> for SubstitutionValue {
    fn from(value: i64) -> Self {
        SubstitutionValue::Number(value.into())
    }
}

impl From<u64> for SubstitutionValue {
    fn from(value: u64) -> Self {
        SubstitutionValue::Number(value.into())
    }
}

/// Placeholder token to value mapping making up one arm.
pub type Arm = BTreeMap<String, SubstitutionValue>;

/// Arms of a sweep keyed by arm name.
pub type Sweep = BTreeMap<String, Arm>;

/// Every sweep of an experiment keyed by sweep name.
pub type SweepTable = BTreeMap<String, Sweep>;

/// One group of explicit combinations sharing the same pinned sweeps.
///
/// Serialized as the nested list form: `[]` for [`CombinationBlock::FullyFactorial`],
/// otherwise `[[sweep, ...], [arm, ...], ...]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<String>>", into = "Vec<Vec<String>>")]
pub enum CombinationBlock {
    /// No sweep is pinned; every sweep is expanded factorially.
    FullyFactorial,
    /// Sweeps pinned to explicit rows; built through [`CombinationBlock::explicit`].
    Explicit(ExplicitRows),
}

/// Pinned sweeps and their arm rows. `rows[i][j]` selects the arm of
/// `pinned[j]` for the i-th combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplicitRows {
    pinned: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CombinationBlock {
    /// Builds an explicit block, rejecting duplicate pinned sweeps and rows
    /// whose length differs from the pinned list.
    pub fn explicit(pinned: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, SweepError> {
        let mut seen = BTreeSet::new();
        for sweep in &pinned {
            if !seen.insert(sweep.as_str()) {
                return Err(SweepError::Input(
                    ErrorInfo::new(
                        "duplicate-pinned-sweep",
                        format!("sweep `{sweep}` is pinned more than once in one combination block"),
                    )
                    .with_context("sweep", sweep.as_str()),
                ));
            }
        }
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != pinned.len() {
                return Err(SweepError::Input(
                    ErrorInfo::new(
                        "row-arity",
                        format!(
                            "combination row {} names {} arms for {} pinned sweeps",
                            idx + 1,
                            row.len(),
                            pinned.len()
                        ),
                    )
                    .with_context("row", (idx + 1).to_string()),
                ));
            }
        }
        Ok(CombinationBlock::Explicit(ExplicitRows { pinned, rows }))
    }

    /// Sweeps whose arms are fixed by this block.
    pub fn pinned(&self) -> &[String] {
        match self {
            CombinationBlock::FullyFactorial => &[],
            CombinationBlock::Explicit(explicit) => &explicit.pinned,
        }
    }

    /// Explicit arm rows, parallel to [`CombinationBlock::pinned`].
    pub fn rows(&self) -> &[Vec<String>] {
        match self {
            CombinationBlock::FullyFactorial => &[],
            CombinationBlock::Explicit(explicit) => &explicit.rows,
        }
    }
}

impl TryFrom<Vec<Vec<String>>> for CombinationBlock {
    type Error = SweepError;

    fn try_from(mut lists: Vec<Vec<String>>) -> Result<Self, Self::Error> {
        if lists.is_empty() {
            return Ok(CombinationBlock::FullyFactorial);
        }
        let pinned = lists.remove(0);
        CombinationBlock::explicit(pinned, lists)
    }
}

impl From<CombinationBlock> for Vec<Vec<String>> {
    fn from(block: CombinationBlock) -> Self {
        match block {
            CombinationBlock::FullyFactorial => Vec::new(),
            CombinationBlock::Explicit(ExplicitRows { pinned, rows }) => {
                let mut lists = Vec::with_capacity(rows.len() + 1);
                lists.push(pinned);
                lists.extend(rows);
                lists
            }
        }
    }
}

/// The `combinations` entry of an experiment: either one block, or several
/// keyed blocks whose outputs are concatenated in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Combinations {
    Single(CombinationBlock),
    Keyed(Vec<(String, CombinationBlock)>),
}

impl Combinations {
    /// Blocks in processing order.
    pub fn blocks(&self) -> Vec<&CombinationBlock> {
        match self {
            Combinations::Single(block) => vec![block],
            Combinations::Keyed(entries) => entries.iter().map(|(_, block)| block).collect(),
        }
    }
}

impl Default for Combinations {
    fn default() -> Self {
        Combinations::Single(CombinationBlock::FullyFactorial)
    }
}

impl Serialize for Combinations {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Combinations::Single(block) => block.serialize(serializer),
            Combinations::Keyed(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, block) in entries {
                    map.serialize_entry(key, block)?;
                }
                map.end()
            }
        }
    }
}

struct CombinationsVisitor;

impl<'de> Visitor<'de> for CombinationsVisitor {
    type Value = Combinations;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a list of name lists or a map of such lists")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut lists: Vec<Vec<String>> = Vec::new();
        while let Some(list) = seq.next_element()? {
            lists.push(list);
        }
        CombinationBlock::try_from(lists)
            .map(Combinations::Single)
            .map_err(de::Error::custom)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::new();
        while let Some((key, block)) = map.next_entry::<String, CombinationBlock>()? {
            entries.push((key, block));
        }
        Ok(Combinations::Keyed(entries))
    }
}

impl<'de> Deserialize<'de> for Combinations {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(CombinationsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_render_without_fraction() {
        assert_eq!(SubstitutionValue::from(2i64).render(), "2");
        assert_eq!(SubstitutionValue::float(2.5).unwrap().render(), "2.5");
        assert!(SubstitutionValue::float(f64::NAN).is_none());
        assert_eq!(SubstitutionValue::from("hey").render(), "hey");
    }

    #[test]
    fn values_parse_untagged() {
        let arm: Arm = serde_json::from_str(r#"{"@p1@": 2, "@p2@": "1", "@p3@": 0.5}"#).unwrap();
        assert_eq!(arm["@p1@"], SubstitutionValue::from(2i64));
        assert_eq!(arm["@p2@"], SubstitutionValue::from("1"));
        assert_eq!(arm["@p3@"].render(), "0.5");
        assert!(serde_json::from_str::<Arm>(r#"{"@p1@": true}"#).is_err());
    }

    #[test]
    fn empty_list_is_fully_factorial() {
        let combos: Combinations = serde_json::from_str("[]").unwrap();
        assert_eq!(combos, Combinations::Single(CombinationBlock::FullyFactorial));
        assert_eq!(serde_json::to_string(&combos).unwrap(), "[]");
    }

    #[test]
    fn list_form_splits_pinned_and_rows() {
        let combos: Combinations =
            serde_json::from_str(r#"[["itn","irs"],["itn80","irs66"],["itn90","irs66"]]"#).unwrap();
        let blocks = combos.blocks();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].pinned(), ["itn", "irs"]);
        assert_eq!(blocks[0].rows().len(), 2);
    }

    #[test]
    fn pinned_list_without_rows_stays_explicit() {
        let combos: Combinations = serde_json::from_str(r#"[[]]"#).unwrap();
        let blocks = combos.blocks();
        assert!(blocks[0].pinned().is_empty());
        assert!(blocks[0].rows().is_empty());
        assert!(matches!(blocks[0], CombinationBlock::Explicit(_)));
    }

    #[test]
    fn keyed_form_keeps_document_order() {
        let combos: Combinations = serde_json::from_str(
            r#"{"zeta": [["itn"],["itn80"]], "alpha": [], "mid": [["irs"],["irs66"]]}"#,
        )
        .unwrap();
        let Combinations::Keyed(entries) = &combos else {
            panic!("expected keyed combinations");
        };
        let keys: Vec<_> = entries.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
        assert_eq!(entries[1].1, CombinationBlock::FullyFactorial);
        let json = serde_json::to_string(&combos).unwrap();
        assert!(json.starts_with(r#"{"zeta":"#));
    }

    #[test]
    fn malformed_blocks_are_rejected() {
        let arity = serde_json::from_str::<Combinations>(r#"[["itn","irs"],["itn80"]]"#);
        assert!(arity.unwrap_err().to_string().contains("row-arity"));
        let dup = serde_json::from_str::<Combinations>(r#"[["itn","itn"],["a","b"]]"#);
        assert!(dup.unwrap_err().to_string().contains("duplicate-pinned-sweep"));
        assert!(serde_json::from_str::<Combinations>(r#""itn""#).is_err());
    }

    #[test]
    fn explicit_blocks_only_come_from_the_checked_constructor() {
        let dup = CombinationBlock::explicit(
            vec!["itn".into(), "itn".into()],
            vec![vec!["a".into(), "b".into()]],
        );
        assert_eq!(dup.unwrap_err().info().code, "duplicate-pinned-sweep");
        let short = CombinationBlock::explicit(vec!["itn".into()], vec![vec![]]);
        assert_eq!(short.unwrap_err().info().code, "row-arity");
        let block =
            CombinationBlock::explicit(vec!["itn".into()], vec![vec!["itn80".into()]]).unwrap();
        assert!(matches!(block, CombinationBlock::Explicit(_)));
        assert_eq!(block.pinned(), ["itn"]);
        assert_eq!(block.rows(), [vec!["itn80".to_string()]]);
    }
}
