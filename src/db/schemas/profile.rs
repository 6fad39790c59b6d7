//! Profile document schema
//!
//! At most one profile per identity, keyed by the owner's user id.
//! Experience and education entries are prepended (most recent first) and
//! carry their own ObjectId so they can be deleted individually.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;
use crate::types::ApiError;

/// Collection name for profiles
pub const PROFILE_COLLECTION: &str = "profiles";

/// Social links, all optional
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct SocialLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
}

/// A work experience entry
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Experience {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default)]
    pub current: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// An education entry
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Education {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub school: String,
    pub degree: String,
    pub fieldofstudy: String,
    pub from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default)]
    pub current: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Profile document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ProfileDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at)
    #[serde(default)]
    pub metadata: Metadata,

    /// Owning identity; the trust boundary for profile mutations
    pub user: ObjectId,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,

    pub status: String,

    /// Ordered skill list
    pub skills: Vec<String>,

    #[serde(default)]
    pub social: SocialLinks,

    /// Most recent first
    #[serde(default)]
    pub experience: Vec<Experience>,

    /// Most recent first
    #[serde(default)]
    pub education: Vec<Education>,
}

impl ProfileDoc {
    /// Create a new profile for an identity
    pub fn new(user: ObjectId, status: String, skills: Vec<String>) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            user,
            company: None,
            website: None,
            location: None,
            bio: None,
            status,
            skills,
            social: SocialLinks::default(),
            experience: Vec::new(),
            education: Vec::new(),
        }
    }

    /// Prepend an experience entry (most recent first)
    pub fn add_experience(&mut self, entry: Experience) {
        self.experience.insert(0, entry);
    }

    /// Remove an experience entry by its id
    pub fn remove_experience(&mut self, id: &ObjectId) -> Result<(), ApiError> {
        let before = self.experience.len();
        self.experience.retain(|e| e.id != *id);
        if self.experience.len() == before {
            return Err(ApiError::NotFound("Experience not found".into()));
        }
        Ok(())
    }

    /// Prepend an education entry (most recent first)
    pub fn add_education(&mut self, entry: Education) {
        self.education.insert(0, entry);
    }

    /// Remove an education entry by its id
    pub fn remove_education(&mut self, id: &ObjectId) -> Result<(), ApiError> {
        let before = self.education.len();
        self.education.retain(|e| e.id != *id);
        if self.education.len() == before {
            return Err(ApiError::NotFound("Education not found".into()));
        }
        Ok(())
    }
}

impl IntoIndexes for ProfileDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // One profile per identity
            (
                doc! { "user": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("user_unique".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for ProfileDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_experience(title: &str) -> Experience {
        Experience {
            id: ObjectId::new(),
            title: title.into(),
            company: "Acme".into(),
            location: None,
            from: "2020-01-01".into(),
            to: None,
            current: true,
            description: None,
        }
    }

    #[test]
    fn test_experience_prepends() {
        let mut profile = ProfileDoc::new(ObjectId::new(), "Developer".into(), vec![]);
        profile.add_experience(sample_experience("first"));
        profile.add_experience(sample_experience("second"));

        assert_eq!(profile.experience.len(), 2);
        assert_eq!(profile.experience[0].title, "second");
        assert_eq!(profile.experience[1].title, "first");
    }

    #[test]
    fn test_remove_experience_by_id() {
        let mut profile = ProfileDoc::new(ObjectId::new(), "Developer".into(), vec![]);
        let entry = sample_experience("keep");
        let doomed = sample_experience("delete");
        let doomed_id = doomed.id;
        profile.add_experience(entry);
        profile.add_experience(doomed);

        profile.remove_experience(&doomed_id).unwrap();
        assert_eq!(profile.experience.len(), 1);
        assert_eq!(profile.experience[0].title, "keep");

        // Removing again is a lookup miss
        let err = profile.remove_experience(&doomed_id).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_remove_education_missing() {
        let mut profile = ProfileDoc::new(ObjectId::new(), "Developer".into(), vec![]);
        let err = profile.remove_education(&ObjectId::new()).unwrap_err();
        assert_eq!(err.to_string(), "Education not found");
    }
}
