//! Read-only course and quiz catalog.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::{Course, CourseId, Quiz};

pub const DEFAULT_CATALOG_PATH: &str = "catalog.yaml";

/// Static content shipped next to the service.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    courses: Vec<Course>,
    #[serde(default)]
    quizzes: HashMap<CourseId, Quiz>,
}

impl Catalog {
    /// Load the YAML catalog. A missing or invalid file yields an empty
    /// catalog, every lookup then reports "not available".
    pub fn read(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let catalog = File::open(path)
            .map_err(|err| err.to_string())
            .and_then(|file| {
                serde_yaml::from_reader::<_, Catalog>(file).map_err(|err| err.to_string())
            });

        match catalog {
            Ok(catalog) => {
                tracing::info!(
                    path = %path.display(),
                    courses = catalog.courses.len(),
                    quizzes = catalog.quizzes.len(),
                    "catalog loaded"
                );
                catalog
            },
            Err(err) => {
                tracing::error!(path = %path.display(), error = %err, "catalog unavailable");
                Self::default()
            },
        }
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn course(&self, id: CourseId) -> Option<&Course> {
        self.courses.iter().find(|course| course.id == id)
    }

    pub fn quiz(&self, course_id: CourseId) -> Option<&Quiz> {
        self.quizzes.get(&course_id)
    }
}
