//! Per-unit FIFO order queues.
//!
//! A [`StrategicUnit`] holds a queue of orders. Only the front order runs,
//! once per frame, until it reports completion; it is then popped and the
//! next order starts on the following frame.
//!
//! Each stage has a closed set of orders ([`IndustrialOrder`],
//! [`SpaceOrder`]) dispatched with an exhaustive `match`. New behaviors are
//! added by implementing [`Order`] and adding a variant for the stage that
//! needs it.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::components::{EntityId, GroupMember};
use crate::data::UnitData;
use crate::facade::OrderWorld;
use crate::math::Vec2;

/// Minimum `dot(heading, desired)` before a unit moves forward.
pub const ALIGNMENT_TOLERANCE: f32 = 0.99;

/// Physical state of a unit that orders act on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitBody {
    /// Map position.
    pub position: Vec2,
    /// Normalized facing direction.
    pub heading: Vec2,
    /// Travel speed in map units per second.
    pub speed: f32,
    /// Turning speed in radians per second.
    pub turn_rate: f32,
}

impl UnitBody {
    /// Create a body facing along +X.
    #[must_use]
    pub const fn new(position: Vec2, speed: f32, turn_rate: f32) -> Self {
        Self {
            position,
            heading: Vec2::UNIT_X,
            speed,
            turn_rate,
        }
    }

    /// Create a body with the movement stats of a unit type.
    #[must_use]
    pub fn from_data(data: &UnitData, position: Vec2) -> Self {
        Self::new(position, data.speed, data.turn_rate)
    }
}

/// Lifecycle of a queued order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderState {
    /// Queued, never worked on.
    Pending,
    /// Worked on at least once.
    InProgress,
    /// Finished. Terminal.
    Completed,
}

/// One kind of autonomous unit behavior.
pub trait Order {
    /// Do one frame of work.
    ///
    /// Returns `true` once the order is complete. Called at most once per
    /// frame and never again after returning `true`.
    fn work_on_order(
        &mut self,
        body: &mut UnitBody,
        world: &mut dyn OrderWorld,
        delta: f32,
    ) -> bool;
}

/// Travel to a point: turn first, then move in a straight line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementOrder {
    /// Destination.
    pub target: Vec2,
}

impl MovementOrder {
    /// Create a movement order.
    #[must_use]
    pub const fn new(target: Vec2) -> Self {
        Self { target }
    }

    fn advance(&self, body: &mut UnitBody, delta: f32) -> bool {
        let to_target = self.target - body.position;
        let distance = to_target.length();
        if distance <= f32::EPSILON {
            body.position = self.target;
            return true;
        }

        let desired = to_target * (1.0 / distance);

        // Alignment is judged on the heading the frame started with, so a
        // frame that needed turning never also translates.
        let aligned = body.heading.dot(desired) >= ALIGNMENT_TOLERANCE;
        body.heading = body
            .heading
            .rotate_towards(desired, body.turn_rate * delta);

        if !aligned {
            return false;
        }

        let step = body.speed * delta;
        if distance < step {
            body.position = self.target;
            return true;
        }

        body.position += desired * step;
        false
    }
}

impl Order for MovementOrder {
    fn work_on_order(
        &mut self,
        body: &mut UnitBody,
        _world: &mut dyn OrderWorld,
        delta: f32,
    ) -> bool {
        self.advance(body, delta)
    }
}

/// Supply and finish a structure from the stage's resource container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOrder {
    /// Structure to build.
    pub target: EntityId,
}

impl BuildOrder {
    /// Create a build order.
    #[must_use]
    pub const fn new(target: EntityId) -> Self {
        Self { target }
    }
}

impl Order for BuildOrder {
    fn work_on_order(
        &mut self,
        _body: &mut UnitBody,
        world: &mut dyn OrderWorld,
        _delta: f32,
    ) -> bool {
        let Some((structure, resources)) = world.build_target(self.target) else {
            tracing::warn!(target_id = self.target, "Build target no longer exists");
            return true;
        };

        if structure.is_completed() {
            return true;
        }

        // Retried every frame until the whole bundle can be paid.
        if !structure.deposit_bulk_resources(resources) {
            tracing::trace!(target_id = self.target, "Waiting for construction resources");
            return false;
        }

        if structure.force_completion() {
            world.structure_completed(self.target);
        }
        true
    }
}

/// Orders available to industrial-stage ground units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum IndustrialOrder {
    /// Drive to a point.
    Move(MovementOrder),
}

impl Order for IndustrialOrder {
    fn work_on_order(
        &mut self,
        body: &mut UnitBody,
        world: &mut dyn OrderWorld,
        delta: f32,
    ) -> bool {
        match self {
            Self::Move(order) => order.work_on_order(body, world, delta),
        }
    }
}

/// Orders available to space-stage fleets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpaceOrder {
    /// Fly to a point.
    Move(MovementOrder),
    /// Construct a space structure.
    Build(BuildOrder),
}

impl Order for SpaceOrder {
    fn work_on_order(
        &mut self,
        body: &mut UnitBody,
        world: &mut dyn OrderWorld,
        delta: f32,
    ) -> bool {
        match self {
            Self::Move(order) => order.work_on_order(body, world, delta),
            Self::Build(order) => order.work_on_order(body, world, delta),
        }
    }
}

/// An order plus its lifecycle state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedOrder<O> {
    order: O,
    state: OrderState,
}

impl<O: Order> QueuedOrder<O> {
    /// Wrap a fresh order.
    #[must_use]
    pub const fn new(order: O) -> Self {
        Self {
            order,
            state: OrderState::Pending,
        }
    }

    /// The wrapped order.
    #[must_use]
    pub const fn order(&self) -> &O {
        &self.order
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> OrderState {
        self.state
    }

    /// Run one frame of the order.
    ///
    /// Returns `true` if the order is completed. A completed order is not
    /// worked on again.
    pub fn process_order(
        &mut self,
        body: &mut UnitBody,
        world: &mut dyn OrderWorld,
        delta: f32,
    ) -> bool {
        match self.state {
            OrderState::Completed => return true,
            OrderState::Pending => self.state = OrderState::InProgress,
            OrderState::InProgress => {}
        }

        if self.order.work_on_order(body, world, delta) {
            self.state = OrderState::Completed;
        }
        self.state == OrderState::Completed
    }
}

/// A controllable unit with its own order queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategicUnit<O> {
    /// Entity id.
    pub id: EntityId,
    /// Unit type id from game data.
    pub kind: String,
    /// Physical state.
    pub body: UnitBody,
    /// Orders, front is active.
    orders: VecDeque<QueuedOrder<O>>,
}

impl<O: Order> StrategicUnit<O> {
    /// Create a unit with an empty order queue.
    #[must_use]
    pub fn new(id: EntityId, kind: impl Into<String>, body: UnitBody) -> Self {
        Self {
            id,
            kind: kind.into(),
            body,
            orders: VecDeque::new(),
        }
    }

    /// Replace every queued order with `order`.
    ///
    /// Effects the discarded orders already committed are kept.
    pub fn perform_order(&mut self, order: O) {
        if !self.orders.is_empty() {
            tracing::debug!(unit = self.id, discarded = self.orders.len(), "Orders replaced");
        }
        self.orders.clear();
        self.orders.push_back(QueuedOrder::new(order));
    }

    /// Append `order` behind the existing ones.
    pub fn queue_order(&mut self, order: O) {
        self.orders.push_back(QueuedOrder::new(order));
    }

    /// The active order.
    #[must_use]
    pub fn current_order(&self) -> Option<&QueuedOrder<O>> {
        self.orders.front()
    }

    /// Number of queued orders.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Whether the unit has nothing to do.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.orders.is_empty()
    }

    /// Work on the front order for one frame.
    ///
    /// Returns `true` if an order completed (and was removed) this frame.
    /// An empty queue does nothing.
    pub fn process_order_queue(&mut self, delta: f32, world: &mut dyn OrderWorld) -> bool {
        let Some(front) = self.orders.front_mut() else {
            return false;
        };

        let finished = front.process_order(&mut self.body, world, delta);
        if finished {
            self.orders.pop_front();
            tracing::trace!(unit = self.id, remaining = self.orders.len(), "Order completed");
        }
        finished
    }
}

impl<O> GroupMember for StrategicUnit<O> {
    fn id(&self) -> EntityId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Storage;
    use crate::data::StructureData;
    use crate::facade::ResourceFacade;
    use crate::resources::{ResourceBundle, ResourceContainer, WorldResource};
    use crate::structures::Structure;
    use std::f32::consts::PI;

    const ROCK: WorldResource = WorldResource(2);

    #[derive(Default)]
    struct TestWorld {
        resources: ResourceContainer,
        structures: Vec<Structure>,
        completed: Vec<EntityId>,
    }

    impl ResourceFacade for TestWorld {
        fn resources(&self) -> &ResourceContainer {
            &self.resources
        }

        fn resources_mut(&mut self) -> &mut ResourceContainer {
            &mut self.resources
        }
    }

    impl OrderWorld for TestWorld {
        fn build_target(
            &mut self,
            id: EntityId,
        ) -> Option<(&mut Structure, &mut ResourceContainer)> {
            let structure = self.structures.iter_mut().find(|s| s.id == id)?;
            Some((structure, &mut self.resources))
        }

        fn structure_completed(&mut self, id: EntityId) {
            self.completed.push(id);
        }
    }

    fn world_with_site() -> TestWorld {
        let data = StructureData {
            id: "dock".to_string(),
            name: "structure.dock".to_string(),
            cost: ResourceBundle::from([(ROCK, 30.0)]),
            construction_time: 0.0,
            housing: None,
            storage: Some(Storage { capacity: 50.0 }),
            production: None,
            research: None,
        };
        TestWorld {
            resources: ResourceContainer::new(100.0),
            structures: vec![Structure::placed(7, &data, Vec2::ZERO)],
            completed: Vec::new(),
        }
    }

    fn unit<O: Order>(turn_rate: f32) -> StrategicUnit<O> {
        StrategicUnit::new(1, "scout", UnitBody::new(Vec2::ZERO, 2.0, turn_rate))
    }

    #[test]
    fn test_misaligned_frame_only_rotates() {
        let mut world = TestWorld::default();
        let mut unit = unit::<IndustrialOrder>(PI);
        unit.queue_order(IndustrialOrder::Move(MovementOrder::new(Vec2::new(0.0, 10.0))));

        assert!(!unit.process_order_queue(1.0, &mut world));
        assert_eq!(unit.body.position, Vec2::ZERO);
        assert!(unit.body.heading.dot(Vec2::new(0.0, 1.0)) > 0.999);

        assert!(!unit.process_order_queue(1.0, &mut world));
        assert!((unit.body.position.y - 2.0).abs() < 1e-5);
        assert!(unit.body.position.x.abs() < 1e-5);
    }

    #[test]
    fn test_slow_turn_takes_several_frames() {
        let mut world = TestWorld::default();
        let mut unit = unit::<IndustrialOrder>(PI / 8.0);
        unit.perform_order(IndustrialOrder::Move(MovementOrder::new(Vec2::new(0.0, 10.0))));

        for _ in 0..3 {
            unit.process_order_queue(1.0, &mut world);
            assert_eq!(unit.body.position, Vec2::ZERO);
        }
        assert_eq!(unit.current_order().unwrap().state(), OrderState::InProgress);
    }

    #[test]
    fn test_arrival_snaps_to_target() {
        let mut world = TestWorld::default();
        let mut unit = unit::<IndustrialOrder>(PI);
        let target = Vec2::new(5.0, 0.0);
        unit.queue_order(IndustrialOrder::Move(MovementOrder::new(target)));

        let mut frames = 0;
        while !unit.is_idle() {
            unit.process_order_queue(1.0, &mut world);
            frames += 1;
            assert!(frames < 10, "movement never completed");
        }

        assert_eq!(unit.body.position, target);
        assert_eq!(frames, 3);
    }

    #[test]
    fn test_already_at_target_completes() {
        let mut world = TestWorld::default();
        let mut unit = unit::<IndustrialOrder>(PI);
        unit.queue_order(IndustrialOrder::Move(MovementOrder::new(Vec2::ZERO)));

        assert!(unit.process_order_queue(0.016, &mut world));
        assert!(unit.is_idle());
    }

    #[test]
    fn test_perform_order_replaces_queue() {
        let mut unit = unit::<IndustrialOrder>(PI);
        for x in 1..4 {
            unit.queue_order(IndustrialOrder::Move(MovementOrder::new(Vec2::new(
                x as f32, 0.0,
            ))));
        }
        assert_eq!(unit.order_count(), 3);

        let target = Vec2::new(-4.0, 0.0);
        unit.perform_order(IndustrialOrder::Move(MovementOrder::new(target)));

        assert_eq!(unit.order_count(), 1);
        assert_eq!(
            unit.current_order().map(QueuedOrder::order),
            Some(&IndustrialOrder::Move(MovementOrder::new(target)))
        );
    }

    #[test]
    fn test_queue_order_keeps_front() {
        let mut world = TestWorld::default();
        let mut unit = unit::<IndustrialOrder>(PI);
        let first = IndustrialOrder::Move(MovementOrder::new(Vec2::new(10.0, 0.0)));
        unit.queue_order(first);
        unit.process_order_queue(1.0, &mut world);

        unit.queue_order(IndustrialOrder::Move(MovementOrder::new(Vec2::new(0.0, 5.0))));

        let front = unit.current_order().unwrap();
        assert_eq!(front.order(), &first);
        assert_eq!(front.state(), OrderState::InProgress);
        assert_eq!(unit.order_count(), 2);
    }

    #[test]
    fn test_empty_queue_is_noop() {
        let mut world = TestWorld::default();
        let mut unit = unit::<SpaceOrder>(PI);
        let before = unit.body;

        assert!(!unit.process_order_queue(1.0, &mut world));
        assert_eq!(unit.body, before);
    }

    #[test]
    fn test_build_order_waits_then_finishes() {
        let mut world = world_with_site();
        let mut unit = unit::<SpaceOrder>(PI);
        unit.queue_order(SpaceOrder::Build(BuildOrder::new(7)));
        world.resources.add(ROCK, 20.0);

        for _ in 0..5 {
            assert!(!unit.process_order_queue(1.0, &mut world));
        }
        assert_eq!(world.resources.available(ROCK), 20.0);
        assert!(!world.structures[0].is_completed());

        assert!(world.completed.is_empty());

        world.resources.add(ROCK, 15.0);
        assert!(unit.process_order_queue(1.0, &mut world));
        assert!(world.structures[0].is_completed());
        assert!((world.resources.available(ROCK) - 5.0).abs() < 1e-5);
        assert!(unit.is_idle());
        assert_eq!(world.completed, vec![7]);
    }

    #[test]
    fn test_build_order_on_finished_target_reports_nothing() {
        let mut world = world_with_site();
        world.structures[0].force_completion();
        let mut unit = unit::<SpaceOrder>(PI);
        unit.queue_order(SpaceOrder::Build(BuildOrder::new(7)));

        assert!(unit.process_order_queue(1.0, &mut world));
        assert!(world.completed.is_empty());
    }

    #[test]
    fn test_build_order_on_missing_target_completes() {
        let mut world = TestWorld::default();
        let mut unit = unit::<SpaceOrder>(PI);
        unit.queue_order(SpaceOrder::Build(BuildOrder::new(99)));

        assert!(unit.process_order_queue(1.0, &mut world));
        assert!(unit.is_idle());
    }

    #[test]
    fn test_completed_order_not_reinvoked() {
        let mut world = TestWorld::default();
        let mut queued = QueuedOrder::new(MovementOrder::new(Vec2::ZERO));
        let mut body = UnitBody::new(Vec2::ZERO, 1.0, 1.0);

        assert!(queued.process_order(&mut body, &mut world, 1.0));
        body.position = Vec2::new(3.0, 3.0);
        assert!(queued.process_order(&mut body, &mut world, 1.0));
        assert_eq!(body.position, Vec2::new(3.0, 3.0));
    }
}
