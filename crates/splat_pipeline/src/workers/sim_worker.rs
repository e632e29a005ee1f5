//! The sim context: owns the near subset and steps it.

use splat_core::{Material, Record, Vec3};
use splat_sim::{collide_in_place, integrate, update_distances, SimulationParams};

use crate::protocol::{SimRequest, SimResponse};

/// State held by the sim worker.
#[derive(Debug)]
pub struct SimContext {
    records: Vec<Record>,
    eye: Vec3,
    params: SimulationParams,
}

impl SimContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new(params: SimulationParams) -> Self {
        Self {
            records: Vec::new(),
            eye: Vec3::ZERO,
            params,
        }
    }

    /// Records currently held.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Handles one request.
    pub fn handle(&mut self, request: SimRequest) -> SimResponse {
        match request {
            SimRequest::Merge { records, eye } => {
                self.records = records;
                self.eye = eye;
                SimResponse::Merged {
                    len: self.records.len(),
                }
            }
            SimRequest::Simulate { dt } => self.simulate(dt),
        }
    }

    fn simulate(&mut self, dt: f32) -> SimResponse {
        update_distances(&mut self.records, self.eye);
        let collisions = collide_in_place(&mut self.records, true, &self.params);
        let advanced = integrate(&mut self.records, dt, &self.params);
        tracing::trace!(collisions, advanced, dt, "simulation step");

        let records = self
            .records
            .iter()
            .filter(|r| r.material() == Material::Movable && !r.is_free())
            .copied()
            .collect();
        SimResponse::Simulated { records, collisions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splat_core::{IdAllocator, RecordBlueprint};

    #[test]
    fn test_reports_only_movable_records() {
        let mut ids = IdAllocator::default();
        let player = ids.create(&RecordBlueprint::new(Vec3::new(5.0, 5.0, 5.0), Vec3::splat(0.5), Material::Player)).unwrap();
        let ground = ids.create(&RecordBlueprint::new(Vec3::ZERO, Vec3::splat(0.5), Material::Immovable)).unwrap();
        let ball = ids.create(&RecordBlueprint::new(Vec3::new(0.0, 10.0, 0.0), Vec3::splat(0.5), Material::Movable)).unwrap();

        let mut context = SimContext::new(SimulationParams::default());
        context.handle(SimRequest::Merge {
            records: vec![player, ground, ball],
            eye: Vec3::ZERO,
        });

        let SimResponse::Simulated { records, .. } = context.handle(SimRequest::Simulate { dt: 0.1 }) else {
            panic!("expected a simulate result");
        };
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id(), ball.id());
        assert!(records[0].velocity.y < 0.0);
    }

    #[test]
    fn test_ball_comes_to_rest_on_ground() {
        let mut ids = IdAllocator::default();
        let ground = ids.create(&RecordBlueprint::new(Vec3::ZERO, Vec3::splat(0.5), Material::Immovable)).unwrap();
        let ball = ids.create(&RecordBlueprint::new(Vec3::new(0.0, 4.0, 0.0), Vec3::splat(0.5), Material::Movable)).unwrap();

        let mut context = SimContext::new(SimulationParams::default());
        context.handle(SimRequest::Merge {
            records: vec![ground, ball],
            eye: Vec3::ZERO,
        });
        for _ in 0..200 {
            context.handle(SimRequest::Simulate { dt: 0.016 });
        }

        let ball = context.records()[1];
        // Radii sum to 3; the ball must not have sunk far below that.
        assert!(ball.position.y > 2.0, "ball fell to {}", ball.position.y);
        assert_eq!(context.records()[0], ground);
    }
}
