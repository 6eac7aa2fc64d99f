//! Content-based hashing for run IDs.

use sha2::{Digest, Sha256};
use stc_project::schema::ScenarioDef;

/// SHA-256 over the scenario's JSON form and the engine version, hex encoded.
pub fn compute_run_id(scenario: &ScenarioDef, engine_version: &str) -> String {
    let mut hasher = Sha256::new();

    let scenario_json = serde_json::to_string(scenario).unwrap_or_default();
    hasher.update(scenario_json.as_bytes());
    hasher.update(engine_version.as_bytes());

    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stc_project::schema::*;

    fn scenario(id: &str, duration_s: f64) -> ScenarioDef {
        ScenarioDef {
            id: id.to_string(),
            name: "Test".to_string(),
            model: ModelDef {
                kind: ModelKind::RigidBody,
                initial_conditions: vec![0.5, -0.3, 0.2],
                noise_stddev: 0.0,
            },
            discipline: DisciplineDef::SelfTriggered,
            duration_s,
            seed: None,
            disturbance: None,
            solver: None,
        }
    }

    #[test]
    fn hash_stability() {
        let s = scenario("rb", 1.0);
        let hash1 = compute_run_id(&s, "v1");
        let hash2 = compute_run_id(&s.clone(), "v1");
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
        assert!(hash1.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn hash_differs_for_different_inputs() {
        let base = compute_run_id(&scenario("rb", 1.0), "v1");
        assert_ne!(base, compute_run_id(&scenario("rb", 2.0), "v1"));
        assert_ne!(base, compute_run_id(&scenario("rb2", 1.0), "v1"));
        assert_ne!(base, compute_run_id(&scenario("rb", 1.0), "v2"));
    }
}
