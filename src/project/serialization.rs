// Serialization utilities for disk persistence

use crate::project::ProjectError;
use crate::project::types::*;
use crate::sequencer::pattern::Pattern;
use ron::{from_str as ron_from_str, to_string as ron_to_string};

/// Serialize every pattern slot to RON (`None` for unused slots)
pub fn serialize_grids_to_ron(slots: &[Option<Pattern>]) -> Result<String, ProjectError> {
    let grids: Vec<Option<GridSerializable>> = slots
        .iter()
        .map(|slot| slot.as_ref().map(GridSerializable::from))
        .collect();

    ron_to_string(&grids).map_err(|e| {
        ProjectError::SerializationError(format!("Failed to serialize patterns to RON: {}", e))
    })
}

/// Deserialize pattern slots from RON, checking every grid's shape
pub fn deserialize_grids_from_ron(ron_data: &str) -> Result<Vec<Option<Pattern>>, ProjectError> {
    let grids: Vec<Option<GridSerializable>> = ron_from_str(ron_data).map_err(|e| {
        ProjectError::SerializationError(format!("Failed to deserialize patterns from RON: {}", e))
    })?;

    grids
        .into_iter()
        .enumerate()
        .map(|(index, grid)| {
            grid.map(Pattern::try_from)
                .transpose()
                .map_err(|e| ProjectError::InvalidStructure(format!("Pattern {}: {}", index, e)))
        })
        .collect()
}

/// Serialize the disk configuration to pretty JSON
pub fn serialize_config_to_json(config: &DiskConfig) -> Result<String, ProjectError> {
    serde_json::to_string_pretty(config).map_err(|e| {
        ProjectError::SerializationError(format!("Failed to serialize config to JSON: {}", e))
    })
}

/// Deserialize the disk configuration from JSON
pub fn deserialize_config_from_json(json_data: &str) -> Result<DiskConfig, ProjectError> {
    serde_json::from_str(json_data).map_err(|e| {
        ProjectError::SerializationError(format!("Failed to deserialize config from JSON: {}", e))
    })
}

/// Split a project into its config file contents and grid slots
pub fn project_to_config(project: &Project) -> (DiskConfig, &[Option<Pattern>]) {
    let config = DiskConfig {
        global: project.global.clone(),
        patterns: project.bank.all_meta().to_vec(),
        songs: project.songs.clone(),
        pads: project.pads.clone(),
        saved_at: project.saved_at.clone(),
    };
    (config, project.bank.slots())
}

/// Rebuild a project from its config and grid slots
pub fn project_from_config(
    config: DiskConfig,
    grids: Vec<Option<Pattern>>,
) -> Result<Project, ProjectError> {
    if grids.len() != config.patterns.len() {
        return Err(ProjectError::InvalidStructure(format!(
            "{} pattern grids but {} pattern entries",
            grids.len(),
            config.patterns.len()
        )));
    }

    Ok(Project {
        global: config.global,
        bank: crate::sequencer::pattern::PatternBank::from_parts(grids, config.patterns),
        songs: config.songs,
        pads: config.pads,
        saved_at: config.saved_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::pattern::Cell;
    use crate::sequencer::song::Song;
    use crate::sequencer::swing::Swing;

    #[test]
    fn test_grids_ron_keeps_unused_slots() {
        let mut pattern = Pattern::new(2).unwrap();
        *pattern.cell_mut(0, 0).unwrap() = Cell::hit(12);
        *pattern.cell_mut(31, 191).unwrap() = Cell::hit(0);
        let slots = vec![Some(pattern), None, None];

        let ron_data = serialize_grids_to_ron(&slots).unwrap();
        let loaded = deserialize_grids_from_ron(&ron_data).unwrap();
        assert_eq!(loaded, slots);
    }

    #[test]
    fn test_malformed_grid_reports_slot() {
        let ron_data = "[None, Some((rows: [[(true, 12)]]))]";
        let err = deserialize_grids_from_ron(ron_data).unwrap_err();
        assert!(matches!(err, ProjectError::InvalidStructure(_)));
        assert!(err.to_string().contains("Pattern 1"));
    }

    #[test]
    fn test_config_json_fields() {
        let mut project = Project::default();
        project.bank.meta_mut(0).unwrap().swing = Swing::new(2);
        project.set_song(3, Some(Song::new("verse", 100.0)));

        let (config, _) = project_to_config(&project);
        let json = serialize_config_to_json(&config).unwrap();
        assert!(json.contains("\"bpm\": 90.0"));
        assert!(json.contains("\"swing\": 2"));
        assert!(json.contains("\"quantize\": 0"));

        let loaded = deserialize_config_from_json(&json).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_grid_count_mismatch() {
        let project = Project::default();
        let (config, _) = project_to_config(&project);
        let result = project_from_config(config, vec![None; 3]);
        assert!(matches!(result, Err(ProjectError::InvalidStructure(_))));
    }

    #[test]
    fn test_invalid_json() {
        assert!(deserialize_config_from_json("{ not json").is_err());
    }
}
