//! Fish - a single koi swimming in a pond.

use std::f32::consts::TAU;

use rand::Rng;

use crate::atlas::{Atlas, RandomSource};
use crate::buffer::{dequantize_unit, quantize_unit, BinBuffer, FormatError};
use crate::constraint::Constraint;
use crate::math::Vec2;
use crate::water::Water;

use super::body::Body;
use super::pattern::Patterns;

/// Distance in pond units per tick at full size.
const SWIM_SPEED: f32 = 0.02;
/// Maximum random heading change per tick in radians.
const WANDER_ANGLE: f32 = 0.06;
/// Heading change per tick while steering away from an edge.
const TURN_ANGLE: f32 = 0.15;
/// How far ahead edges are probed, in body lengths.
const LOOKAHEAD: f32 = 1.5;
/// Fish closer than this interact.
pub const INTERACTION_DISTANCE: f32 = 1.2;
/// Maximum heading blend toward a neighbour per interaction.
const ALIGNMENT: f32 = 0.08;
/// Growth per tick at a growth gene of 255.
const GROWTH_RATE: f32 = 0.0008;
/// Growth needed before a fish may mate.
pub const MATURITY: f32 = 0.6;
/// Courtship ticks per missing mating frequency step.
const MATE_DELAY_SCALE: u16 = 2;
/// Chance per tick of disturbing the water surface.
const DISTURB_CHANCE: f32 = 0.02;
const DISTURB_AMOUNT: f32 = 0.3;

/// Life cycle genes drawn from a blueprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Genes {
    pub growth_speed: u8,
    pub mating_frequency: u8,
    /// Inherited and saved with the fish but not read by the simulation:
    /// matings produce no offspring, new fish only arrive through the river.
    pub offspring_count: u8,
    /// Age in ticks at which the fish dies
    pub lifetime: u16,
}

/// A fish and all of its state.
#[derive(Debug)]
pub struct Fish {
    pub body: Body,
    pub genes: Genes,
    pub position: Vec2,
    last_position: Vec2,
    pub direction: Vec2,
    age: u16,
    growth: f32,
    /// Fish interacted with this tick
    pub interactions: u32,
    /// Index of the last fish interacted with this tick
    pub last_interaction: Option<usize>,
    /// Consecutive ticks spent courting a single partner
    pub mate_time: u16,
    matings: u16,
}

impl Fish {
    /// Heading for fish created without a usable direction.
    pub const DEFAULT_HEADING: Vec2 = Vec2::new(1.0, 0.0);

    pub fn new(body: Body, genes: Genes, position: Vec2, direction: Vec2) -> Self {
        Self {
            body,
            genes,
            position,
            last_position: position,
            direction: direction.normalize_or(Self::DEFAULT_HEADING),
            age: 0,
            growth: 0.0,
            interactions: 0,
            last_interaction: None,
            mate_time: 0,
            matings: 0,
        }
    }

    pub fn with_age(mut self, age: u16) -> Self {
        self.age = age.min(self.genes.lifetime);
        self
    }

    pub fn with_growth(mut self, growth: f32) -> Self {
        self.growth = growth.clamp(0.0, 1.0);
        self
    }

    pub fn age(&self) -> u16 {
        self.age
    }

    pub fn growth(&self) -> f32 {
        self.growth
    }

    pub fn matings(&self) -> u16 {
        self.matings
    }

    /// Body length at the current growth.
    pub fn size(&self) -> f32 {
        self.body.size(self.growth)
    }

    fn speed(&self) -> f32 {
        SWIM_SPEED * (0.5 + 0.5 * self.growth)
    }

    /// Courtship ticks needed before this fish is ready to mate.
    pub fn mate_delay(&self) -> u16 {
        (u8::MAX - self.genes.mating_frequency) as u16 * MATE_DELAY_SCALE + 1
    }

    pub fn is_adult(&self) -> bool {
        self.growth >= MATURITY
    }

    pub fn can_mate(&self) -> bool {
        self.is_adult() && self.mate_time >= self.mate_delay()
    }

    pub fn mate(&mut self) {
        self.mate_time = 0;
        self.matings = self.matings.saturating_add(1);
    }

    /// Position for rendering between the previous and the current tick.
    pub fn render_position(&self, time: f32) -> Vec2 {
        self.last_position.lerp(&self.position, time)
    }

    /// Teleport, without interpolating from the old position.
    pub fn move_to(&mut self, position: Vec2) {
        self.position = position;
        self.last_position = position;
    }

    pub fn at_position(&self, x: f32, y: f32) -> bool {
        self.body
            .at_position(self.position, self.direction, self.growth, x, y)
    }

    /// Register an interaction with `other` if the two are close enough.
    /// `index` and `other_index` are both fish's places in their pond.
    pub fn interact(
        &mut self,
        other: &mut Fish,
        index: usize,
        other_index: usize,
        rng: &mut impl Rng,
    ) -> bool {
        if self.position.distance_squared(&other.position)
            > INTERACTION_DISTANCE * INTERACTION_DISTANCE
        {
            return false;
        }

        self.interactions += 1;
        other.interactions += 1;
        self.last_interaction = Some(other_index);
        other.last_interaction = Some(index);

        let mine = self.direction;
        let theirs = other.direction;

        self.direction = Self::blend(mine, theirs, ALIGNMENT * rng.gen::<f32>());
        other.direction = Self::blend(theirs, mine, ALIGNMENT * rng.gen::<f32>());

        true
    }

    fn blend(from: Vec2, to: Vec2, amount: f32) -> Vec2 {
        let blended = from.lerp(&to, amount).normalize();

        if blended == Vec2::ZERO {
            from
        } else {
            blended
        }
    }

    /// Advance one tick. Returns true when the fish died of old age.
    pub fn update<C: Constraint>(
        &mut self,
        constraint: &C,
        water: &mut impl Water,
        rng: &mut impl Rng,
    ) -> bool {
        self.age = self.age.saturating_add(1);

        if self.age >= self.genes.lifetime {
            return true;
        }

        self.last_position = self.position;
        self.growth = (self.growth + GROWTH_RATE * self.genes.growth_speed as f32 / 255.0).min(1.0);

        if self.is_adult() {
            self.mate_time = self.mate_time.saturating_add(1);
        }

        self.direction = self
            .direction
            .rotate(rng.gen_range(-WANDER_ANGLE..=WANDER_ANGLE));
        self.avoid_edges(constraint);

        let next = self.position + self.direction * self.speed();

        if constraint.contains(next.x, next.y) {
            self.position = next;
        } else {
            self.direction = self.direction * -1.0;
        }

        if rng.gen::<f32>() < DISTURB_CHANCE {
            water.disturb(
                self.position,
                self.body.thickness(self.growth) * 2.0,
                DISTURB_AMOUNT * self.speed(),
            );
        }

        false
    }

    fn avoid_edges<C: Constraint>(&mut self, constraint: &C) {
        let reach = self.size().max(0.1) * LOOKAHEAD;
        let clear = |direction: Vec2| {
            let probe = self.position + direction * reach;
            constraint.contains(probe.x, probe.y)
        };

        if clear(self.direction) {
            return;
        }

        let left = self.direction.rotate(TURN_ANGLE);
        let right = self.direction.rotate(-TURN_ANGLE);

        self.direction = if !clear(left) && clear(right) {
            right
        } else {
            left
        }
        .normalize();
    }

    /// Release the atlas slot. Safe to call more than once.
    pub fn free(&mut self, atlas: &mut impl Atlas) {
        self.body.pattern.release(atlas);
    }

    /// Make sure the pattern has an atlas slot and is drawn in it.
    pub fn attach(&mut self, atlas: &mut impl Atlas, random_source: &RandomSource) {
        self.body.pattern.attach(atlas, random_source);
    }

    pub fn serialize(&self, buffer: &mut BinBuffer) {
        buffer.write_u8(self.genes.growth_speed);
        buffer.write_u8(self.genes.mating_frequency);
        buffer.write_u8(self.genes.offspring_count);
        buffer.write_u16(self.genes.lifetime);
        buffer.write_u16(self.age);
        buffer.write_u8((self.growth * 255.0).round() as u8);
        buffer.write_u16(self.mate_time);
        buffer.write_u16(self.matings);
        buffer.write_u16(quantize_unit(self.direction.angle().rem_euclid(TAU) / TAU));
        self.body.serialize(buffer);
    }

    /// Read a fish record. The fish has no atlas slot until attached.
    pub fn read(
        buffer: &mut BinBuffer,
        position: Vec2,
        patterns: &Patterns,
    ) -> Result<Self, FormatError> {
        let genes = Genes {
            growth_speed: buffer.read_u8()?,
            mating_frequency: buffer.read_u8()?,
            offspring_count: buffer.read_u8()?,
            lifetime: buffer.read_u16()?,
        };

        if genes.lifetime == 0 {
            return Err(FormatError::OutOfRange {
                field: "fish lifetime",
                value: 0,
            });
        }

        let age = buffer.read_u16()?;

        if age >= genes.lifetime {
            return Err(FormatError::OutOfRange {
                field: "fish age",
                value: age as u32,
            });
        }

        let growth = buffer.read_u8()? as f32 / 255.0;
        let mate_time = buffer.read_u16()?;
        let matings = buffer.read_u16()?;
        let angle = dequantize_unit(buffer.read_u16()?) * TAU;
        let body = Body::deserialize(buffer, patterns)?;

        let mut fish = Fish::new(body, genes, position, Vec2::from_angle(angle))
            .with_age(age)
            .with_growth(growth);
        fish.mate_time = mate_time;
        fish.matings = matings;

        Ok(fish)
    }

    /// Read a fish record and draw its pattern into the atlas.
    pub fn deserialize(
        buffer: &mut BinBuffer,
        position: Vec2,
        atlas: &mut impl Atlas,
        patterns: &Patterns,
        random_source: &RandomSource,
    ) -> Result<Self, FormatError> {
        let mut fish = Self::read(buffer, position, patterns)?;
        fish.attach(atlas, random_source);

        Ok(fish)
    }
}
