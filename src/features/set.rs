use serde::{Deserialize, Serialize};

use crate::errors::{ServiceError, ServiceResult};

use super::post::PostFeature;
use super::user::UserFeature;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Post,
    User,
}

impl FeatureKind {
    pub const ALL: [FeatureKind; 2] = [FeatureKind::Post, FeatureKind::User];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKind::Post => "post",
            FeatureKind::User => "user",
        }
    }
}

impl std::str::FromStr for FeatureKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "post" | "posts" => Ok(FeatureKind::Post),
            "user" | "users" => Ok(FeatureKind::User),
            _ => Err(format!("Unknown feature: {}", s)),
        }
    }
}

impl std::fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A borrowed handle to one declared feature.
#[derive(Clone, Copy)]
pub enum FeatureRef<'a> {
    Post(&'a dyn PostFeature),
    User(&'a dyn UserFeature),
}

impl FeatureRef<'_> {
    pub fn kind(&self) -> FeatureKind {
        match self {
            FeatureRef::Post(_) => FeatureKind::Post,
            FeatureRef::User(_) => FeatureKind::User,
        }
    }
}

impl std::fmt::Debug for FeatureRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("FeatureRef").field(&self.kind()).finish()
    }
}

/// The capabilities a service declared at construction.
///
/// Built once and never mutated afterwards; lookups of undeclared features
/// fail with `ServiceError::FeatureNotImplemented`.
#[derive(Default)]
pub struct FeatureSet {
    post: Option<Box<dyn PostFeature>>,
    user: Option<Box<dyn UserFeature>>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_post(mut self, feature: impl PostFeature + 'static) -> Self {
        self.post = Some(Box::new(feature));
        self
    }

    pub fn with_user(mut self, feature: impl UserFeature + 'static) -> Self {
        self.user = Some(Box::new(feature));
        self
    }

    pub fn post(&self) -> ServiceResult<&dyn PostFeature> {
        self.post
            .as_deref()
            .ok_or(ServiceError::FeatureNotImplemented(FeatureKind::Post))
    }

    pub fn user(&self) -> ServiceResult<&dyn UserFeature> {
        self.user
            .as_deref()
            .ok_or(ServiceError::FeatureNotImplemented(FeatureKind::User))
    }

    pub fn get(&self, kind: FeatureKind) -> ServiceResult<FeatureRef<'_>> {
        match kind {
            FeatureKind::Post => self.post().map(FeatureRef::Post),
            FeatureKind::User => self.user().map(FeatureRef::User),
        }
    }

    pub fn supports(&self, kind: FeatureKind) -> bool {
        match kind {
            FeatureKind::Post => self.post.is_some(),
            FeatureKind::User => self.user.is_some(),
        }
    }

    /// Declared features in a stable order.
    pub fn kinds(&self) -> Vec<FeatureKind> {
        FeatureKind::ALL
            .into_iter()
            .filter(|kind| self.supports(*kind))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds().is_empty()
    }
}

impl std::fmt::Debug for FeatureSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureSet")
            .field("kinds", &self.kinds())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Post, User};
    use crate::features::post::MockPostFeature;
    use crate::features::user::MockUserFeature;
    use crate::features::{FetchResult, FreshListRequest, Page, UserByIdRequest};

    #[test]
    fn test_feature_kind_parse() {
        assert_eq!("post".parse::<FeatureKind>().unwrap(), FeatureKind::Post);
        assert_eq!("USER".parse::<FeatureKind>().unwrap(), FeatureKind::User);
        assert!("comments".parse::<FeatureKind>().is_err());
    }

    #[test]
    fn test_empty_set_fails_closed() {
        let set = FeatureSet::new();

        assert!(set.is_empty());
        assert!(!set.supports(FeatureKind::Post));
        let err = set.post().err().unwrap();
        assert!(err.to_string().contains("Not implemented yet."));
        assert!(matches!(
            set.get(FeatureKind::User),
            Err(ServiceError::FeatureNotImplemented(FeatureKind::User))
        ));
    }

    #[test]
    fn test_declared_feature_dispatches() {
        let mut post = MockPostFeature::new();
        post.expect_fetch_fresh_list()
            .times(1)
            .returning(|_| Ok(FetchResult::ok(Page::last(vec![Post::new("s", "u", "1")]))));

        let set = FeatureSet::new().with_post(post);

        assert_eq!(set.kinds(), vec![FeatureKind::Post]);
        let result = set
            .post()
            .unwrap()
            .fetch_fresh_list(&FreshListRequest::first())
            .unwrap();
        assert_eq!(result.data().unwrap().len(), 1);
        assert!(set.user().is_err());
    }

    #[test]
    fn test_get_by_kind() {
        let mut user = MockUserFeature::new();
        user.expect_fetch_by_id()
            .returning(|req| Ok(FetchResult::ok(User::new(req.user_id.clone(), "Name"))));

        let set = FeatureSet::new().with_user(user);

        match set.get(FeatureKind::User).unwrap() {
            FeatureRef::User(feature) => {
                let result = feature.fetch_by_id(&UserByIdRequest::new("42")).unwrap();
                assert_eq!(result.data().unwrap().id, "42");
            }
            other => panic!("unexpected feature {:?}", other),
        }
    }
}
