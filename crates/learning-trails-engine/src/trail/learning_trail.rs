use std::path::PathBuf;

use relative_path::RelativePathBuf;
use thiserror::Error;

use crate::localization::Localizer;
use crate::options::ParseOptions;
use crate::store::{KeyValueStore, StoreValue};
use crate::xml::{SlimXmlParser, XmlParseError};

use super::builder::TrailBuilder;
use super::step::{AssessmentState, LearningStep};

const ACTIVE_PAGE_INDEX_KEY: &str = "activePageIndex";

#[derive(Debug, Error)]
pub enum TrailError {
    #[error(transparent)]
    Parse(#[from] XmlParseError),
    #[error("trail has no name")]
    MissingIdentifier,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LearningTrail {
    pub name: String,
    /// `trail.` followed by the trail's name.
    pub identifier: String,
    pub steps: Vec<LearningStep>,
    /// Background image as authored, relative to the trail file.
    pub background_image: Option<RelativePathBuf>,
    /// Background image resolved on disk, when it exists.
    pub background_image_path: Option<PathBuf>,
    /// Why loading failed. A trail with an error message is not loaded.
    pub error_message: Option<String>,
}

impl LearningTrail {
    pub fn new(
        name: impl Into<String>,
        identifier: impl Into<String>,
        steps: Vec<LearningStep>,
        background_image: Option<RelativePathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            identifier: identifier.into(),
            steps,
            background_image,
            background_image_path: None,
            error_message: None,
        }
    }

    /// Parses trail XML. Malformed blocks are skipped; only XML syntax
    /// errors and a missing trail name fail.
    pub fn parse(
        xml: &str,
        options: &ParseOptions,
        localizer: Option<&dyn Localizer>,
    ) -> Result<Self, TrailError> {
        let localizer = localizer.filter(|_| options.localization_enabled);
        let mut builder = TrailBuilder::new(*options);
        SlimXmlParser::new(xml)
            .with_localizer(localizer)
            .parse(&mut builder)?;
        let trail = builder.finish()?;
        log::info!("parsed {} with {} steps", trail.identifier, trail.steps.len());
        Ok(trail)
    }

    /// Like [`parse`](Self::parse), but a failure is kept as
    /// `error_message` on an empty trail instead of returned.
    pub fn load(xml: &str, options: &ParseOptions, localizer: Option<&dyn Localizer>) -> Self {
        match Self::parse(xml, options, localizer) {
            Ok(trail) => trail,
            Err(e) => {
                let message = match &e {
                    TrailError::Parse(parse) => format!("Line {}: {}", parse.line, parse.message),
                    other => other.to_string(),
                };
                log::error!("trail failed to load: {message}");
                let mut trail = Self::new("", "", Vec::new(), None);
                trail.error_message = Some(message);
                trail
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.error_message.is_none() && !self.identifier.is_empty()
    }

    pub fn step(&self, index: usize) -> Option<&LearningStep> {
        self.steps.get(index)
    }

    pub fn step_mut(&mut self, index: usize) -> Option<&mut LearningStep> {
        self.steps.get_mut(index)
    }

    pub fn assessable_steps(&self) -> Vec<&LearningStep> {
        self.steps.iter().filter(|s| s.is_assessable).collect()
    }

    /// Rolls the assessable steps up into one state.
    pub fn assessment_state(&self) -> AssessmentState {
        let assessable = self.assessable_steps();
        if assessable.is_empty() {
            AssessmentState::NotAssessable
        } else if assessable
            .iter()
            .all(|s| s.assessment_state == AssessmentState::CompletedSuccessfully)
        {
            AssessmentState::CompletedSuccessfully
        } else if assessable
            .iter()
            .any(|s| s.assessment_state == AssessmentState::PartiallyCompleted)
        {
            AssessmentState::PartiallyCompleted
        } else {
            AssessmentState::Unknown
        }
    }

    /// Replaces every step whose signature differs in `other` and returns
    /// their indexes. Trails with different step counts are left alone.
    pub fn update_steps_from(&mut self, other: LearningTrail) -> Vec<usize> {
        if other.steps.len() != self.steps.len() {
            log::warn!(
                "reloaded {} has {} steps, expected {}",
                self.identifier,
                other.steps.len(),
                self.steps.len()
            );
            return Vec::new();
        }

        let mut updated = Vec::new();
        for (index, (old, new)) in self.steps.iter_mut().zip(other.steps).enumerate() {
            if old.signature() != new.signature() {
                *old = new;
                updated.push(index);
            }
        }
        updated
    }

    /// Restores saved responses for every step.
    pub fn load_response_state(&mut self, store: &dyn KeyValueStore) {
        for step in &mut self.steps {
            step.load_response_state(store);
        }
    }

    pub fn save_active_page_index(&self, store: &mut dyn KeyValueStore, index: usize) {
        let mut state = store
            .get(&self.identifier)
            .and_then(|v| v.as_dictionary().cloned())
            .unwrap_or_default();
        state.insert(
            ACTIVE_PAGE_INDEX_KEY.to_string(),
            StoreValue::Integer(index as i64),
        );
        store.set(&self.identifier, StoreValue::Dictionary(state));
    }

    /// The saved page index, if one was saved and is still in range.
    pub fn load_active_page_index(&self, store: &dyn KeyValueStore) -> Option<usize> {
        let saved = store.get(&self.identifier)?;
        let index = saved.as_dictionary()?.get(ACTIVE_PAGE_INDEX_KEY)?.as_integer()?;
        usize::try_from(index).ok().filter(|i| *i < self.steps.len())
    }

    fn state_loaded_key(&self) -> String {
        format!("TrailStateLoaded.{}", self.identifier)
    }

    pub fn mark_state_loaded(&self, store: &mut dyn KeyValueStore) {
        store.set(&self.state_loaded_key(), StoreValue::Bool(true));
    }

    /// Whether this trail's state has been loaded before.
    pub fn is_state_loaded(&self, store: &dyn KeyValueStore) -> bool {
        store
            .get(&self.state_loaded_key())
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}
