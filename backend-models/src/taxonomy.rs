use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Colors {
    #[serde(default)]
    pub border: Option<String>,
    #[serde(default)]
    pub bg: Option<String>,
    #[serde(default)]
    pub shadow: Option<String>,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub colors: Option<Colors>,
    /// Number of verbs below the group.
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub total: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub sample: Option<String>,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub group_id: Option<i64>,
    #[serde(default)]
    pub colors: Option<Colors>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub total: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub sample: Option<String>,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubfamilyRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub family_id: Option<i64>,
    #[serde(default)]
    pub colors: Option<Colors>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub total: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub sample: Option<String>,
}

/// A verb as listed under its subfamily. Older backends omit `id` and
/// `name`; `all_forms` is always present there.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerbRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub all_forms: Option<String>,
    #[serde(default)]
    pub subfamily_id: Option<i64>,
    #[serde(default)]
    pub colors: Option<Colors>,
    #[serde(default)]
    pub description: Option<String>,
}

impl VerbRecord {
    /// `all_forms` when present, otherwise `name`.
    pub fn display_name(&self) -> Option<&str> {
        self.all_forms
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.name.as_deref())
    }
}

/// `GET /verbs/{id}`, bare or wrapped in `{ "verb": ... }` / `{ "data": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum VerbEnvelope {
    Wrapped { verb: VerbRecord },
    Data { data: VerbRecord },
    Bare(VerbRecord),
}

impl VerbEnvelope {
    pub fn into_verb(self) -> VerbRecord {
        match self {
            Self::Wrapped { verb } | Self::Data { data: verb } | Self::Bare(verb) => verb,
        }
    }
}

/// `GET /groups`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupsResponse {
    #[serde(default)]
    pub groups: Vec<GroupRecord>,
}

/// `GET /groups/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupShowResponse {
    pub group: GroupRecord,
    #[serde(default)]
    pub families: Vec<FamilyRecord>,
}

/// `GET /families/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyShowResponse {
    pub family: FamilyRecord,
    #[serde(default)]
    pub subfamilies: Vec<SubfamilyRecord>,
}

/// `GET /subfamilies/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubfamilyShowResponse {
    pub subfamily: SubfamilyRecord,
    #[serde(default)]
    pub verbs: Vec<VerbRecord>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn group_detail_accepts_string_totals_and_missing_fields() {
        let body = r##"{
            "group": { "id": 1, "name": "A", "total": "10",
                       "colors": { "border": "#a00", "bg": "#fee", "shadow": "#ccc" } },
            "families": [
                { "id": 11, "name": "A1", "group_id": 1, "total": 6, "sample": "hablar" },
                { "id": 12, "name": "A2", "total": null }
            ]
        }"##;
        let parsed: GroupShowResponse = serde_json::from_str(body).unwrap();

        assert_eq!(parsed.group.total, Some(10));
        assert_eq!(
            parsed.group.colors.and_then(|c| c.bg),
            Some("#fee".to_string())
        );
        assert_eq!(parsed.families[0].group_id, Some(1));
        assert_eq!(parsed.families[0].sample.as_deref(), Some("hablar"));
        assert_eq!(parsed.families[1].total, None);
        assert_eq!(parsed.families[1].group_id, None);
    }

    #[test]
    fn verb_name_prefers_all_forms() {
        let verbs: Vec<VerbRecord> = serde_json::from_str(
            r#"[{ "all_forms": "hablar, hablo" }, { "id": 7, "name": "comer", "all_forms": "" }]"#,
        )
        .unwrap();
        assert_eq!(verbs[0].display_name(), Some("hablar, hablo"));
        assert_eq!(verbs[0].id, None);
        assert_eq!(verbs[1].display_name(), Some("comer"));
    }

    #[test]
    fn verb_detail_accepts_every_envelope() {
        for body in [
            r#"{ "verb": { "id": 7, "name": "comer", "subfamily_id": 111 } }"#,
            r#"{ "data": { "id": 7, "name": "comer", "subfamily_id": 111 } }"#,
            r#"{ "id": 7, "name": "comer", "subfamily_id": 111 }"#,
        ] {
            let verb = serde_json::from_str::<VerbEnvelope>(body).unwrap().into_verb();
            assert_eq!(verb.id, Some(7), "{body}");
            assert_eq!(verb.display_name(), Some("comer"));
            assert_eq!(verb.subfamily_id, Some(111));
        }
    }
}
