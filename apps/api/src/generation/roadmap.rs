//! Career roadmap: maps model output to a `CareerRoadmapResult`.
//!
//! Unlike interview questions, a roadmap has a safe non-empty default: when the model
//! returns no usable stage, one fixed foundations stage is substituted.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::generation::lenient::{self, decode_or_default, parse_model_output};
use crate::generation::models::{
    CareerRoadmapRequest, CareerRoadmapResult, RoadmapResource, RoadmapStage,
};

pub const FALLBACK_STAGE_TITLE: &str = "Foundations";
pub const FALLBACK_STAGE_MONTHS: u32 = 2;
pub const DEFAULT_STAGE_MONTHS: u32 = 1;
pub const DEFAULT_RESOURCE_TYPE: &str = "LINK";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRoadmap {
    #[serde(deserialize_with = "lenient::items")]
    stages: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawStage {
    #[serde(deserialize_with = "lenient::string")]
    id: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    title: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    description: Option<String>,
    #[serde(deserialize_with = "lenient::int")]
    estimated_duration_months: Option<i64>,
    #[serde(deserialize_with = "lenient::string_list")]
    skills_to_learn: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::items")]
    resources: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawResource {
    #[serde(deserialize_with = "lenient::string")]
    title: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    url: Option<String>,
    #[serde(rename = "type", deserialize_with = "lenient::string")]
    resource_type: Option<String>,
}

fn fallback_stage() -> RoadmapStage {
    RoadmapStage {
        id: "s1".to_string(),
        title: FALLBACK_STAGE_TITLE.to_string(),
        description: "Learn the fundamentals of algorithms, data structures and programming."
            .to_string(),
        estimated_duration_months: FALLBACK_STAGE_MONTHS,
        skills_to_learn: vec!["Algorithms".to_string(), "Data Structures".to_string()],
        resources: Vec::new(),
    }
}

fn map_resource(item: Value) -> Option<RoadmapResource> {
    if !item.is_object() {
        return None;
    }
    let raw: RawResource = serde_json::from_value(item).ok()?;

    Some(RoadmapResource {
        title: raw.title.unwrap_or_default(),
        url: raw.url.unwrap_or_default(),
        resource_type: raw
            .resource_type
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_RESOURCE_TYPE.to_string()),
    })
}

/// `position` is 1-based and counts every item the model returned.
fn map_stage(item: Value, position: usize) -> Option<RoadmapStage> {
    if !item.is_object() {
        return None;
    }
    let raw: RawStage = serde_json::from_value(item).ok()?;

    Some(RoadmapStage {
        id: raw
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| format!("s{position}")),
        title: raw.title.unwrap_or_default(),
        description: raw.description.unwrap_or_default(),
        estimated_duration_months: raw
            .estimated_duration_months
            .map(|months| months.clamp(DEFAULT_STAGE_MONTHS as i64, u32::MAX as i64) as u32)
            .unwrap_or(DEFAULT_STAGE_MONTHS),
        skills_to_learn: raw.skills_to_learn.unwrap_or_default(),
        resources: raw
            .resources
            .unwrap_or_default()
            .into_iter()
            .filter_map(map_resource)
            .collect(),
    })
}

/// Maps raw model output to a roadmap. Never fails; never returns zero stages.
pub fn map_career_roadmap(raw: &str, request: &CareerRoadmapRequest) -> CareerRoadmapResult {
    let roadmap: RawRoadmap = decode_or_default(parse_model_output(raw));

    let mut stages: Vec<RoadmapStage> = roadmap
        .stages
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| map_stage(item, i + 1))
        .collect();

    if stages.is_empty() {
        warn!("Model returned no usable roadmap stages; substituting the foundations stage");
        stages.push(fallback_stage());
    }

    CareerRoadmapResult {
        roadmap_id: Uuid::new_v4().to_string(),
        job_field: request.job_field.clone(),
        target_role: request.target_role.clone(),
        current_level: request.current_level.clone(),
        stages,
    }
}
