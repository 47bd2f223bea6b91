//! Pond - a collection of fish bound to one constraint.
//!
//! A tick runs in three phases:
//! 1. Every unordered pair of fish interacts exactly once.
//! 2. Every fish updates, highest index first. Fish that die are only
//!    marked, so indices recorded during the interaction phase stay valid
//!    for the mating check.
//! 3. Marked fish are compacted away and their atlas slots freed.

use rand::Rng;

use crate::atlas::{Atlas, RandomSource};
use crate::buffer::{BinBuffer, FormatError};
use crate::components::{Fish, Patterns};
use crate::constraint::Constraint;
use crate::render::Bodies;
use crate::water::Water;

/// What happened during one pond tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PondUpdate {
    pub deaths: usize,
    pub matings: usize,
}

/// A pond fish cannot escape from.
#[derive(Debug)]
pub struct Pond<C: Constraint> {
    constraint: C,
    fishes: Vec<Fish>,
}

impl<C: Constraint> Pond<C> {
    pub fn new(constraint: C) -> Self {
        Self {
            constraint,
            fishes: Vec::new(),
        }
    }

    pub fn constraint(&self) -> &C {
        &self.constraint
    }

    pub fn fishes(&self) -> &[Fish] {
        &self.fishes
    }

    pub fn fish_count(&self) -> usize {
        self.fishes.len()
    }

    pub fn add_fish(&mut self, fish: Fish) {
        self.fishes.push(fish);
    }

    /// Remove the fish at `index` and free its atlas slot. Returns false
    /// when no such fish exists.
    pub fn remove_fish(&mut self, index: usize, atlas: &mut impl Atlas) -> bool {
        if index >= self.fishes.len() {
            return false;
        }

        let mut fish = self.fishes.remove(index);
        fish.free(atlas);

        true
    }

    /// Take the top-most fish covering the point out of the pond. The fish
    /// keeps its atlas slot; the caller now owns both.
    pub fn pick(&mut self, x: f32, y: f32) -> Option<Fish> {
        if !self.constraint.contains(x, y) {
            return None;
        }

        let index = self.fishes.iter().rposition(|fish| fish.at_position(x, y))?;

        Some(self.fishes.remove(index))
    }

    pub fn update(
        &mut self,
        atlas: &mut impl Atlas,
        water: &mut impl Water,
        rng: &mut impl Rng,
    ) -> PondUpdate {
        let count = self.fishes.len();
        let mut result = PondUpdate::default();

        // Interactions
        for a in (1..count).rev() {
            let (lower, upper) = self.fishes.split_at_mut(a);
            let fish = &mut upper[0];

            for b in (0..a).rev() {
                fish.interact(&mut lower[b], a, b, rng);
            }
        }

        // Fish updates and mating
        let mut dead = vec![false; count];

        for index in (0..count).rev() {
            if self.fishes[index].update(&self.constraint, water, rng) {
                dead[index] = true;
                result.deaths += 1;

                continue;
            }

            let fish = &self.fishes[index];

            if fish.interactions == 1 {
                let partner = fish
                    .last_interaction
                    .filter(|&partner| partner < count && !dead[partner]);

                if let Some(partner) = partner {
                    if fish.can_mate() && self.fishes[partner].can_mate() {
                        self.fishes[index].mate();
                        self.fishes[partner].mate();
                        result.matings += 1;

                        log::debug!("Fish {} mated with fish {}", index, partner);
                    }
                }
            } else {
                self.fishes[index].mate_time = 0;
            }

            let fish = &mut self.fishes[index];
            fish.interactions = 0;
            fish.last_interaction = None;
        }

        // Compaction
        if result.deaths > 0 {
            let mut marks = dead.into_iter();

            self.fishes.retain_mut(|fish| {
                if marks.next().unwrap_or(false) {
                    fish.free(atlas);
                    false
                } else {
                    true
                }
            });

            log::debug!("{} fish died of old age", result.deaths);
        }

        result
    }

    /// Swap in a new constraint, moving every fish to the same relative
    /// position within it. Fish that do not fit are removed and freed.
    /// Returns the number of fish removed.
    pub fn replace_constraint(&mut self, constraint: C, atlas: &mut impl Atlas) -> usize {
        let targets: Vec<_> = self
            .fishes
            .iter()
            .map(|fish| {
                self.constraint
                    .relative_position(fish.position)
                    .and_then(|relative| constraint.absolute_position(&relative))
                    .filter(|position| constraint.contains(position.x, position.y))
            })
            .collect();

        let before = self.fishes.len();
        let mut targets = targets.into_iter();

        self.fishes
            .retain_mut(|fish| match targets.next().flatten() {
                Some(position) => {
                    fish.move_to(position);
                    true
                }
                None => {
                    fish.free(atlas);
                    false
                }
            });

        self.constraint = constraint;

        let removed = before - self.fishes.len();

        if removed > 0 {
            log::debug!("{} fish did not fit the new pond shape", removed);
        }

        removed
    }

    /// Write every fish that has a relative position under the current
    /// constraint. Fish outside it are skipped.
    pub fn serialize(&self, buffer: &mut BinBuffer) {
        let placed: Vec<_> = self
            .fishes
            .iter()
            .filter_map(|fish| {
                self.constraint
                    .relative_position(fish.position)
                    .map(|relative| (relative, fish))
            })
            .take(u16::MAX as usize)
            .collect();

        buffer.write_u16(placed.len() as u16);

        for (relative, fish) in &placed {
            self.constraint.serialize_relative_position(relative, buffer);
            fish.serialize(buffer);
        }
    }

    /// Read fish and add them to the pond. Nothing is added unless every
    /// record is valid. Returns the number of fish read.
    pub fn deserialize(
        &mut self,
        buffer: &mut BinBuffer,
        atlas: &mut impl Atlas,
        patterns: &Patterns,
        random_source: &RandomSource,
    ) -> Result<usize, FormatError> {
        let count = buffer.read_u16()? as usize;
        let mut fishes = Vec::with_capacity(count);

        for index in 0..count {
            let relative = self.constraint.deserialize_relative_position(buffer)?;
            let position = self.constraint.absolute_position(&relative).ok_or(
                FormatError::OutOfRange {
                    field: "fish position",
                    value: index as u32,
                },
            )?;

            fishes.push(Fish::read(buffer, position, patterns)?);
        }

        for fish in &mut fishes {
            fish.attach(atlas, random_source);
        }

        self.fishes.extend(fishes);

        Ok(count)
    }

    /// Write every pattern again, after the atlas was rebuilt.
    pub fn update_atlas(&self, atlas: &mut impl Atlas, random_source: &RandomSource) {
        for fish in &self.fishes {
            atlas.write(&fish.body.pattern, random_source);
        }
    }

    pub fn render(&self, bodies: &mut impl Bodies, time: f32) {
        bodies.render(&self.fishes, time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::SlotAtlas;
    use crate::constraint::{ConstraintCircle, ConstraintRectangle};
    use crate::math::Vec2;
    use crate::render::BodyList;
    use crate::testing::test_fish;
    use crate::water::Ripples;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ready_fish(position: Vec2) -> Fish {
        let mut fish = test_fish(position).with_growth(1.0);
        fish.mate_time = fish.mate_delay();
        fish
    }

    fn circle_pond() -> Pond<ConstraintCircle> {
        Pond::new(ConstraintCircle::new(Vec2::ZERO, 10.0))
    }

    #[test]
    fn test_pair_of_ready_fish_mates() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut atlas = SlotAtlas::new(4);
        let mut water = Ripples::new();
        let mut pond = circle_pond();

        pond.add_fish(ready_fish(Vec2::new(0.0, 0.0)));
        pond.add_fish(ready_fish(Vec2::new(0.5, 0.0)));

        let result = pond.update(&mut atlas, &mut water, &mut rng);

        assert_eq!(result.matings, 1);
        assert_eq!(pond.fishes()[0].matings(), 1);
        assert_eq!(pond.fishes()[1].matings(), 1);
        assert!(pond.fishes().iter().all(|fish| fish.interactions == 0));
    }

    #[test]
    fn test_three_way_interaction_does_not_mate() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut atlas = SlotAtlas::new(4);
        let mut water = Ripples::new();
        let mut pond = circle_pond();

        pond.add_fish(ready_fish(Vec2::new(0.0, 0.0)));
        pond.add_fish(ready_fish(Vec2::new(0.3, 0.0)));
        pond.add_fish(ready_fish(Vec2::new(0.0, 0.3)));

        let result = pond.update(&mut atlas, &mut water, &mut rng);

        assert_eq!(result.matings, 0);
        assert!(pond.fishes().iter().all(|fish| fish.mate_time == 0));
        assert!(pond.fishes().iter().all(|fish| fish.matings() == 0));
    }

    #[test]
    fn test_lonely_fish_resets_courtship() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut atlas = SlotAtlas::new(4);
        let mut water = Ripples::new();
        let mut pond = circle_pond();

        pond.add_fish(ready_fish(Vec2::ZERO));
        pond.update(&mut atlas, &mut water, &mut rng);

        assert_eq!(pond.fishes()[0].mate_time, 0);
    }

    #[test]
    fn test_population_stable_without_deaths() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut atlas = SlotAtlas::new(8);
        let mut water = Ripples::new();
        let mut pond = circle_pond();

        for i in 0..5 {
            pond.add_fish(test_fish(Vec2::from_angle(i as f32) * 6.0));
        }

        for _ in 0..200 {
            let result = pond.update(&mut atlas, &mut water, &mut rng);
            assert_eq!(result.deaths, 0);
        }

        assert_eq!(pond.fish_count(), 5);
    }

    #[test]
    fn test_dead_fish_are_removed_and_freed() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut atlas = SlotAtlas::new(4);
        let source = RandomSource::new(1);
        let mut water = Ripples::new();
        let mut pond = circle_pond();

        let mut old = test_fish(Vec2::new(3.0, 0.0));
        old.genes.lifetime = 1;
        old.attach(&mut atlas, &source);
        let mut young = test_fish(Vec2::new(-3.0, 0.0));
        young.attach(&mut atlas, &source);

        pond.add_fish(young);
        pond.add_fish(old);

        let result = pond.update(&mut atlas, &mut water, &mut rng);

        assert_eq!(result.deaths, 1);
        assert_eq!(pond.fish_count(), 1);
        assert_eq!(atlas.frees(), 1);
        assert_eq!(atlas.in_use(), 1);
    }

    #[test]
    fn test_no_mating_with_dead_partner() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut atlas = SlotAtlas::new(4);
        let mut water = Ripples::new();
        let mut pond = circle_pond();

        let mut dying = ready_fish(Vec2::new(0.5, 0.0));
        dying.genes.lifetime = 1;

        pond.add_fish(ready_fish(Vec2::ZERO));
        pond.add_fish(dying);

        let result = pond.update(&mut atlas, &mut water, &mut rng);

        assert_eq!(result.deaths, 1);
        assert_eq!(result.matings, 0);
        assert_eq!(pond.fishes()[0].matings(), 0);
    }

    #[test]
    fn test_pick() {
        let mut pond = circle_pond();
        pond.add_fish(test_fish(Vec2::new(1.0, 0.0)));
        pond.add_fish(test_fish(Vec2::new(1.0, 0.0)));

        assert!(pond.pick(20.0, 0.0).is_none());
        assert!(pond.pick(-5.0, 0.0).is_none());
        assert_eq!(pond.fish_count(), 2);

        // Newborn spine runs from x = 1 back to x = 0.65
        assert!(pond.pick(0.9, 0.0).is_some());
        assert_eq!(pond.fish_count(), 1);
    }

    #[test]
    fn test_remove_fish_out_of_range() {
        let mut atlas = SlotAtlas::new(4);
        let mut pond = circle_pond();
        pond.add_fish(test_fish(Vec2::ZERO));

        assert!(!pond.remove_fish(3, &mut atlas));
        assert!(pond.remove_fish(0, &mut atlas));
        assert_eq!(pond.fish_count(), 0);
    }

    #[test]
    fn test_replace_constraint_drops_fish_that_do_not_fit() {
        let mut atlas = SlotAtlas::new(4);
        let source = RandomSource::new(1);
        let mut pond = Pond::new(ConstraintRectangle::new(Vec2::ZERO, 10.0, 10.0));

        for x in [2.0, 8.0] {
            let mut fish = test_fish(Vec2::new(x, 5.0));
            fish.attach(&mut atlas, &source);
            pond.add_fish(fish);
        }

        let removed =
            pond.replace_constraint(ConstraintRectangle::new(Vec2::ZERO, 5.0, 10.0), &mut atlas);

        assert_eq!(removed, 1);
        assert_eq!(pond.fish_count(), 1);
        assert_eq!(pond.fishes()[0].position, Vec2::new(2.0, 5.0));
        assert_eq!(atlas.frees(), 1);
        assert_eq!(pond.constraint().width, 5.0);
    }

    #[test]
    fn test_replace_constraint_moves_fish() {
        let mut atlas = SlotAtlas::new(4);
        let mut pond = Pond::new(ConstraintCircle::new(Vec2::ZERO, 2.0));
        pond.add_fish(test_fish(Vec2::new(1.0, 0.0)));

        pond.replace_constraint(ConstraintCircle::new(Vec2::new(5.0, 5.0), 4.0), &mut atlas);

        let moved = pond.fishes()[0].position;
        assert!(moved.distance(&Vec2::new(7.0, 5.0)) < 1e-4);
        assert_eq!(pond.fishes()[0].render_position(0.0), moved);
    }

    #[test]
    fn test_serialization_round_trip() {
        let mut atlas = SlotAtlas::new(4);
        let source = RandomSource::new(3);
        let mut pond = circle_pond();

        let positions = [Vec2::new(1.0, 2.0), Vec2::new(-4.0, 0.5), Vec2::new(0.0, -9.0)];
        for position in positions {
            pond.add_fish(test_fish(position));
        }

        let mut buffer = BinBuffer::new();
        pond.serialize(&mut buffer);
        assert_eq!(&buffer.as_bytes()[..2], &3u16.to_le_bytes());

        let mut reader = BinBuffer::from_bytes(buffer.into_bytes());
        let mut loaded = circle_pond();
        assert_eq!(
            loaded.deserialize(&mut reader, &mut atlas, &Patterns::default(), &source),
            Ok(3)
        );

        assert_eq!(loaded.fish_count(), 3);
        assert_eq!(atlas.in_use(), 3);
        for (fish, position) in loaded.fishes().iter().zip(positions) {
            assert!(fish.position.distance(&position) < 1e-2);
        }
    }

    #[test]
    fn test_fish_outside_constraint_are_not_saved() {
        let mut pond = circle_pond();
        pond.add_fish(test_fish(Vec2::new(1.0, 0.0)));
        pond.add_fish(test_fish(Vec2::new(30.0, 0.0)));

        let mut buffer = BinBuffer::new();
        pond.serialize(&mut buffer);

        assert_eq!(&buffer.as_bytes()[..2], &1u16.to_le_bytes());
    }

    #[test]
    fn test_truncated_load_installs_nothing() {
        let mut atlas = SlotAtlas::new(4);
        let source = RandomSource::new(3);
        let mut pond = circle_pond();
        pond.add_fish(test_fish(Vec2::new(1.0, 0.0)));
        pond.add_fish(test_fish(Vec2::new(2.0, 0.0)));

        let mut buffer = BinBuffer::new();
        pond.serialize(&mut buffer);
        let mut bytes = buffer.into_bytes();
        bytes.truncate(bytes.len() - 3);

        let mut loaded = circle_pond();
        let mut reader = BinBuffer::from_bytes(bytes);

        assert!(matches!(
            loaded.deserialize(&mut reader, &mut atlas, &Patterns::default(), &source),
            Err(FormatError::UnexpectedEnd { .. })
        ));
        assert_eq!(loaded.fish_count(), 0);
        assert_eq!(atlas.in_use(), 0);
    }

    #[test]
    fn test_palette_outside_loading_palette_is_rejected() {
        let mut atlas = SlotAtlas::new(4);
        let source = RandomSource::new(3);
        let mut pond = circle_pond();
        pond.add_fish(test_fish(Vec2::new(1.0, 0.0)));

        let mut buffer = BinBuffer::new();
        pond.serialize(&mut buffer);

        // The fish's base colour sits at x = 4, past a 4 wide palette
        let mut loaded = circle_pond();
        let mut reader = BinBuffer::from_bytes(buffer.into_bytes());
        assert_eq!(
            loaded.deserialize(&mut reader, &mut atlas, &Patterns::new(4, 16), &source),
            Err(FormatError::OutOfRange {
                field: "palette x",
                value: 4
            })
        );
        assert_eq!(loaded.fish_count(), 0);
        assert_eq!(atlas.in_use(), 0);
    }

    #[test]
    fn test_update_atlas_and_render() {
        let mut atlas = SlotAtlas::new(4);
        let source = RandomSource::new(3);
        let mut pond = circle_pond();

        let mut fish = test_fish(Vec2::new(1.0, 1.0));
        fish.attach(&mut atlas, &source);
        pond.add_fish(fish);

        pond.update_atlas(&mut atlas, &RandomSource::new(4));
        assert_eq!(atlas.writes(), 2);

        let slot = pond.fishes()[0].body.pattern.slot().unwrap();
        assert_eq!(atlas.contents(slot).map(|c| c.seed), Some(4));

        let mut bodies = BodyList::new();
        pond.render(&mut bodies, 0.5);
        assert_eq!(bodies.bodies.len(), 1);
        assert_eq!(bodies.bodies[0].position, Vec2::new(1.0, 1.0));
    }
}
