#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    bolero::generator::TypeGenerator,
    serde::Deserialize,
    serde::Serialize,
)]
#[serde(transparent)]
pub struct UserId(pub i64);

/// Author of a comment, as embedded in comment records
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Author {
    #[serde(default)]
    pub id: UserId,

    #[serde(default, alias = "username")]
    pub name: String,

    #[serde(default)]
    pub email: String,
}

impl Author {
    /// Name to display for this author, falling back to the email
    pub fn label(&self) -> &str {
        match self.name.is_empty() {
            true => &self.email,
            false => &self.name,
        }
    }
}
