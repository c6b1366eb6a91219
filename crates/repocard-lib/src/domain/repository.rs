use serde::{Deserialize, Serialize};

/// `data` payload of the repository card query.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CardData {
    /// `None` when Github could not resolve the repository.
    pub repository: Option<RepositoryCard>,
}

/// Summary of a repository as shown on a card
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryCard {
    pub name: String,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent: Option<ParentRepository>,
    #[serde(default)]
    pub languages: Languages,
    #[serde(default)]
    pub stargazer_count: u64,
    #[serde(default)]
    pub fork_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentRepository {
    pub name_with_owner: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Languages {
    #[serde(default)]
    pub nodes: Vec<Language>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Language {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

impl RepositoryCard {
    /// GraphQL document fetching the card for `owner/name`.
    ///
    /// Arguments are quoted as JSON strings, which GraphQL accepts as string literals.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if an argument cannot be quoted.
    pub fn query(owner: &str, name: &str) -> Result<String, serde_json::Error> {
        let name = serde_json::to_string(name)?;
        let owner = serde_json::to_string(owner)?;

        Ok(format!(
            r"{{
  repository(name: {name}, owner: {owner}) {{
    name
    isArchived
    description
    parent {{
      nameWithOwner
    }}
    languages(first: 1, orderBy: {{field: SIZE, direction: DESC}}) {{
      nodes {{
        name
        color
      }}
    }}
    stargazerCount
    forkCount
  }}
}}"
        ))
    }

    /// The language with the most code, if Github reported any.
    #[must_use]
    pub fn primary_language(&self) -> Option<&Language> {
        self.languages.nodes.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_names_repository_and_owner() {
        let query = RepositoryCard::query("abhisheksrocks", "async_button").unwrap();

        assert!(query.contains(r#"repository(name: "async_button", owner: "abhisheksrocks")"#));
        assert!(query.contains("stargazerCount"));
        assert!(query.contains("orderBy: {field: SIZE, direction: DESC}"));
    }

    #[test]
    fn query_escapes_arguments() {
        let query = RepositoryCard::query("own\"er", "na\\me\n").unwrap();

        assert!(query.contains(r#"name: "na\\me\n""#));
        assert!(query.contains(r#"owner: "own\"er""#));

        let control = RepositoryCard::query("owner", "a\u{1}b").unwrap();
        assert!(control.contains(r#"name: "a\u0001b""#));
    }

    #[test]
    fn decodes_full_card() {
        let json = r##"{
            "repository": {
                "name": "async_button",
                "isArchived": false,
                "description": "A button",
                "parent": null,
                "languages": {"nodes": [{"name": "Dart", "color": "#00B4AB"}]},
                "stargazerCount": 12,
                "forkCount": 3
            }
        }"##;

        let data: CardData = serde_json::from_str(json).unwrap();
        let card = data.repository.unwrap();

        assert_eq!(card.name, "async_button");
        assert_eq!(card.description.as_deref(), Some("A button"));
        assert!(card.parent.is_none());
        assert_eq!(card.stargazer_count, 12);
        assert_eq!(card.fork_count, 3);
        let language = card.primary_language().unwrap();
        assert_eq!(language.name, "Dart");
        assert_eq!(language.color.as_deref(), Some("#00B4AB"));
    }

    #[test]
    fn decodes_fork_with_parent() {
        let json = r#"{"name": "fork", "parent": {"nameWithOwner": "upstream/repo"}}"#;

        let card: RepositoryCard = serde_json::from_str(json).unwrap();

        assert_eq!(card.parent.as_ref().unwrap().name_with_owner, "upstream/repo");
        assert!(card.primary_language().is_none());
    }

    #[test]
    fn serializes_with_graphql_field_names() {
        let card = RepositoryCard {
            name: "repo".to_string(),
            is_archived: true,
            description: None,
            parent: None,
            languages: Languages::default(),
            stargazer_count: 1,
            fork_count: 0,
        };

        let json = serde_json::to_value(&card).unwrap();

        assert_eq!(json["isArchived"], true);
        assert_eq!(json["stargazerCount"], 1);
    }
}
