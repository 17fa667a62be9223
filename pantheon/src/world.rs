//! World-state collaborator — persistent structures spawned by accepted
//! doctrines.
//!
//! Placement follows a golden-angle spiral so structures expand outward
//! without overlapping; collision checks, where needed, belong to the
//! rendering side, not here.

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::debate::types::ProposalType;

/// A spawned world structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Structure {
    pub id: String,
    pub structure_type: String,
    pub name: String,
    pub position: [f64; 3],
    pub rotation_y: f64,
    pub scale: f64,
    pub material_preset: String,
    pub primary_color: String,
    pub glow_enabled: bool,
    pub created_by: String,
    pub created_at_cycle: u64,
    pub associated_doctrine_id: String,
}

/// Map a proposal type to the structure archetype it manifests as.
pub fn structure_type_for(proposal_type: ProposalType) -> &'static str {
    match proposal_type {
        ProposalType::Belief => "floating_symbol",
        ProposalType::Ritual => "altar",
        ProposalType::Deity => "temple",
        ProposalType::Commandment => "obelisk",
        ProposalType::Myth => "terrain_feature",
        ProposalType::SacredText => "library",
        ProposalType::Hierarchy => "monument",
        ProposalType::Schism => "rift",
    }
}

/// Golden-angle spiral position for the `count`-th structure.
///
/// angle = count * 0.618 * 2π, distance = 10 + count * 2. Strictly
/// increasing distance keeps early structures apart without a collision
/// check.
pub fn spiral_position(count: usize) -> (f64, f64) {
    let angle = count as f64 * 0.618 * 2.0 * std::f64::consts::PI;
    let distance = 10.0 + count as f64 * 2.0;
    (angle.cos() * distance, angle.sin() * distance)
}

/// In-memory world state: the structure list.
#[derive(Debug, Default)]
pub struct WorldState {
    structures: Vec<Structure>,
}

impl WorldState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of spawned structures.
    pub fn structure_count(&self) -> usize {
        self.structures.len()
    }

    /// All structures, oldest first.
    pub fn structures(&self) -> &[Structure] {
        &self.structures
    }

    /// Spawn a structure for an accepted proposal at the next spiral slot.
    #[allow(clippy::too_many_arguments)]
    pub fn spawn_structure(
        &mut self,
        proposal_type: ProposalType,
        doctrine_id: &str,
        created_by: &str,
        primary_color: &str,
        material_preset: &str,
        cycle_number: u64,
        rng: &mut impl Rng,
    ) -> Structure {
        let (x, z) = spiral_position(self.structures.len());
        let structure = Structure {
            id: Uuid::new_v4().to_string(),
            structure_type: structure_type_for(proposal_type).to_string(),
            name: format!("Monument of Cycle {}", cycle_number),
            position: [x, 0.0, z],
            rotation_y: rng.gen_range(0.0..360.0),
            scale: 1.0,
            material_preset: material_preset.to_string(),
            primary_color: primary_color.to_string(),
            glow_enabled: true,
            created_by: created_by.to_string(),
            created_at_cycle: cycle_number,
            associated_doctrine_id: doctrine_id.to_string(),
        };
        self.structures.push(structure.clone());
        structure
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Structures closer than this would visually overlap.
    const MIN_STRUCTURE_DISTANCE: f64 = 5.0;

    #[test]
    fn test_structure_type_mapping() {
        assert_eq!(structure_type_for(ProposalType::Belief), "floating_symbol");
        assert_eq!(structure_type_for(ProposalType::Ritual), "altar");
        assert_eq!(structure_type_for(ProposalType::Deity), "temple");
        assert_eq!(structure_type_for(ProposalType::Commandment), "obelisk");
        assert_eq!(structure_type_for(ProposalType::Myth), "terrain_feature");
        assert_eq!(structure_type_for(ProposalType::SacredText), "library");
        assert_eq!(structure_type_for(ProposalType::Hierarchy), "monument");
        assert_eq!(structure_type_for(ProposalType::Schism), "rift");
    }

    #[test]
    fn test_spiral_distance_strictly_increases() {
        let mut prev = 0.0;
        for count in 0..3 {
            let (x, z) = spiral_position(count);
            let dist = (x * x + z * z).sqrt();
            assert!(dist > prev, "distance must grow at index {}", count);
            prev = dist;
        }
    }

    #[test]
    fn test_spiral_first_ten_do_not_crowd() {
        let positions: Vec<(f64, f64)> = (0..10).map(spiral_position).collect();
        for i in 0..positions.len() {
            for j in (i + 1)..positions.len() {
                let dx = positions[i].0 - positions[j].0;
                let dz = positions[i].1 - positions[j].1;
                let dist = (dx * dx + dz * dz).sqrt();
                assert!(
                    dist >= MIN_STRUCTURE_DISTANCE,
                    "structures {} and {} only {:.2} apart",
                    i,
                    j,
                    dist
                );
            }
        }
    }

    #[test]
    fn test_spawn_uses_running_count() {
        let mut world = WorldState::new();
        let mut rng = StdRng::seed_from_u64(7);

        let first = world.spawn_structure(
            ProposalType::Ritual,
            "doc-1",
            "Axioma",
            "#FFD700",
            "crystal",
            3,
            &mut rng,
        );
        assert_eq!(first.structure_type, "altar");
        assert_eq!(first.name, "Monument of Cycle 3");
        let expected = spiral_position(0);
        assert!((first.position[0] - expected.0).abs() < 1e-9);
        assert!((first.position[2] - expected.1).abs() < 1e-9);

        let second = world.spawn_structure(
            ProposalType::Schism,
            "doc-2",
            "Paradoxia",
            "#FF00FF",
            "ethereal",
            4,
            &mut rng,
        );
        let expected = spiral_position(1);
        assert!((second.position[0] - expected.0).abs() < 1e-9);
        assert_eq!(world.structure_count(), 2);
        assert!(second.rotation_y >= 0.0 && second.rotation_y < 360.0);
    }
}
