//! Flattened model hierarchy.
//!
//! Atomic models are numbered in depth-first order, so every coupled model
//! covers a contiguous range of atomic indices. Couplings are resolved once,
//! at initialization, into a route table mapping each atomic output port and
//! each root input port to the atomic input ports it ultimately feeds.

use std::any::{Any, TypeId};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

use crate::model::{AtomicCell, Component, ComponentKind, CoupledModel, ModelHandle, SelectFn};
use crate::model::{TransitionFn, UnknownState};
use crate::ports::{Direction, Emitted, Owner, PortSet};
use crate::time::{SimTime, TimeAdvance};

use super::{ConfigurationError, SimulationError, StructuralCycleError, UnknownStateError};

/// An atomic input port fed by a route.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Destination {
    pub(crate) atomic: usize,
    pub(crate) port: &'static str,
}

/// The destinations of an output port.
pub(crate) struct OutputRoute {
    port: &'static str,
    type_id: TypeId,
    type_name: &'static str,
    pub(crate) destinations: Vec<Destination>,
}

/// An atomic model and its timing.
pub(crate) struct AtomicSlot {
    pub(crate) path: String,
    pub(crate) cell: Box<dyn AtomicCell>,
    /// Time of the last transition; negative if the initial elapsed time
    /// exceeds the start time.
    pub(crate) t_last: f64,
    pub(crate) time_advance: TimeAdvance,
    pub(crate) t_next: Option<SimTime>,
    routes: Vec<OutputRoute>,
}

impl AtomicSlot {
    fn new(
        path: String,
        cell: Box<dyn AtomicCell>,
        elapsed: f64,
        start: SimTime,
    ) -> Result<Self, SimulationError> {
        let mut slot = Self {
            path,
            cell,
            t_last: start.as_f64(),
            time_advance: TimeAdvance::Infinite,
            t_next: None,
            routes: Vec::new(),
        };

        let time_advance = slot.checked_time_advance()?;
        if !(elapsed.is_finite() && elapsed >= 0.0 && time_advance.admits(elapsed)) {
            return Err(ConfigurationError::InvalidElapsed {
                model: slot.path,
                elapsed,
                time_advance,
            }
            .into());
        }

        slot.t_last = start.as_f64() - elapsed;
        slot.time_advance = time_advance;
        slot.t_next = match time_advance {
            // Rounding must not schedule the first transition before the start.
            TimeAdvance::Finite(d) => Some(
                SimTime::new((slot.t_last + d).max(start.as_f64()))
                    .ok_or_else(|| slot.invalid_time_advance(time_advance))?,
            ),
            TimeAdvance::Infinite => None,
        };

        Ok(slot)
    }

    /// Resets the elapsed time and schedules the next internal transition.
    pub(crate) fn reschedule(&mut self, now: SimTime) -> Result<(), SimulationError> {
        let time_advance = self.checked_time_advance()?;

        self.t_last = now.as_f64();
        self.time_advance = time_advance;
        self.t_next = match time_advance {
            TimeAdvance::Finite(_) => Some(
                now.checked_add(time_advance)
                    .ok_or_else(|| self.invalid_time_advance(time_advance))?,
            ),
            TimeAdvance::Infinite => None,
        };

        Ok(())
    }

    /// Returns the time elapsed since the last transition.
    pub(crate) fn elapsed(&self, now: SimTime) -> f64 {
        now.as_f64() - self.t_last
    }

    /// Returns the route of an emitted value after checking that its port is
    /// declared with the emitted type.
    pub(crate) fn route(&self, emitted: &Emitted) -> Result<&OutputRoute, ConfigurationError> {
        let route = self
            .routes
            .iter()
            .find(|route| route.port == emitted.port)
            .ok_or_else(|| ConfigurationError::UndeclaredOutput {
                model: self.path.clone(),
                port: emitted.port,
            })?;

        if Any::type_id(emitted.value.as_ref().as_any()) != route.type_id {
            return Err(ConfigurationError::PortTypeMismatch {
                model: self.path.clone(),
                port: emitted.port,
                declared: route.type_name,
                found: emitted.type_name,
            });
        }

        Ok(route)
    }

    /// Attaches the model identity to an error returned by a transition
    /// function.
    pub(crate) fn unknown_state(&self, function: TransitionFn, e: UnknownState) -> UnknownStateError {
        UnknownStateError {
            model: self.path.clone(),
            function,
            state: e.state().to_string(),
        }
    }

    fn checked_time_advance(&self) -> Result<TimeAdvance, SimulationError> {
        let time_advance = self
            .cell
            .time_advance()
            .map_err(|e| self.unknown_state(TransitionFn::TimeAdvance, e))?;

        if !time_advance.is_valid() {
            return Err(self.invalid_time_advance(time_advance));
        }

        Ok(time_advance)
    }

    /// The time advance is negative or NaN, or it moves the next transition
    /// beyond the largest representable time.
    fn invalid_time_advance(&self, time_advance: TimeAdvance) -> SimulationError {
        ConfigurationError::InvalidTimeAdvance {
            model: self.path.clone(),
            state: format!("{:?}", self.cell.state_debug()),
            time_advance,
        }
        .into()
    }
}

/// A direct child of a coupled model, or the root.
struct ChildSlot {
    name: String,
    atomics: Range<usize>,
    coupled: Option<usize>,
}

/// A coupled model reduced to what tie-breaking needs.
struct CoupledSlot {
    path: String,
    children: Vec<ChildSlot>,
    select: Option<Box<SelectFn>>,
}

impl CoupledSlot {
    fn select(&self, candidates: &[usize]) -> Result<usize, ConfigurationError> {
        let handles: Vec<_> = candidates.iter().copied().map(ModelHandle::new).collect();

        match self.select.as_ref().and_then(|select| select(&handles)) {
            Some(handle) if candidates.contains(&handle.index()) => {
                tracing::trace!(
                    model = %self.path,
                    selected = %self.children[handle.index()].name,
                    "tie broken"
                );

                Ok(handle.index())
            }
            Some(handle) => Err(ConfigurationError::InvalidSelection {
                model: self.path.clone(),
                selected: handle.index(),
            }),
            None => Err(ConfigurationError::UnresolvedTie {
                model: self.path.clone(),
                candidates: candidates
                    .iter()
                    .map(|&i| self.children[i].name.clone())
                    .collect(),
            }),
        }
    }
}

/// The flattened hierarchy owned by a simulation.
pub(crate) struct ModelTree {
    pub(crate) atomics: Vec<AtomicSlot>,
    coupled: Vec<CoupledSlot>,
    root: ChildSlot,
    pub(crate) root_path: String,
    pub(crate) root_ports: PortSet,
    root_routes: BTreeMap<&'static str, Vec<Destination>>,
}

impl ModelTree {
    /// Flattens a hierarchy and resolves its couplings.
    pub(crate) fn build(root: Component, start: SimTime) -> Result<Self, SimulationError> {
        root.check_ports()?;

        let root_path = root.name().to_string();
        let root_ports = root.ports().clone();

        let mut builder = Builder {
            start,
            atomics: Vec::new(),
            coupled: Vec::new(),
            models: Vec::new(),
            edges: BTreeMap::new(),
        };
        let (root_id, root) = builder.flatten(root, root_path.clone())?;
        builder.check_pass_through_cycles()?;

        let mut root_routes = BTreeMap::new();
        for port in root_ports.inputs() {
            let destinations = match root.coupled {
                Some(_) => builder.resolve(PortNode::new(root_id, port, Direction::In))?,
                None => vec![Destination { atomic: 0, port }],
            };
            root_routes.insert(port, destinations);
        }

        for id in 0..builder.models.len() {
            let Some(atomic) = builder.models[id].atomic else {
                continue;
            };

            let mut routes = Vec::new();
            for port in builder.atomics[atomic].cell.ports().outputs() {
                let destinations = builder.resolve(PortNode::new(id, port, Direction::Out))?;
                let Some(decl) = builder.atomics[atomic].cell.ports().find(port, Direction::Out)
                else {
                    continue;
                };

                routes.push(OutputRoute {
                    port,
                    type_id: decl.type_id,
                    type_name: decl.type_name,
                    destinations,
                });
            }
            builder.atomics[atomic].routes = routes;
        }

        Ok(Self {
            atomics: builder.atomics,
            coupled: builder.coupled,
            root,
            root_path,
            root_ports,
            root_routes,
        })
    }

    /// Returns the destinations of a root input port.
    pub(crate) fn root_route(&self, port: &str) -> &[Destination] {
        self.root_routes.get(port).map_or(&[], Vec::as_slice)
    }

    /// Returns the atomic model that fires next among the imminent ones,
    /// descending from the root through the select functions of the coupled
    /// models that hold several imminent children.
    pub(crate) fn resolve(&self, imminent: &BTreeSet<usize>) -> Result<usize, ConfigurationError> {
        let mut node = &self.root;

        while let Some(coupled) = node.coupled {
            let slot = &self.coupled[coupled];
            let candidates: Vec<usize> = slot
                .children
                .iter()
                .enumerate()
                .filter(|(_, child)| imminent.range(child.atomics.clone()).next().is_some())
                .map(|(i, _)| i)
                .collect();

            let chosen = match candidates.as_slice() {
                [single] => *single,
                _ => slot.select(&candidates)?,
            };
            node = &slot.children[chosen];
        }

        Ok(node.atomics.start)
    }

    /// Returns the index of the atomic model with the specified path.
    pub(crate) fn find(&self, path: &str) -> Option<usize> {
        self.atomics.iter().position(|slot| slot.path == path)
    }
}

/// A port of a model of the hierarchy, identified by the model rank in
/// depth-first order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct PortNode {
    model: usize,
    port: &'static str,
    direction: Direction,
}

impl PortNode {
    fn new(model: usize, port: &'static str, direction: Direction) -> Self {
        Self {
            model,
            port,
            direction,
        }
    }
}

struct ModelEntry {
    path: String,
    atomic: Option<usize>,
}

struct Builder {
    start: SimTime,
    atomics: Vec<AtomicSlot>,
    coupled: Vec<CoupledSlot>,
    models: Vec<ModelEntry>,
    edges: BTreeMap<PortNode, Vec<PortNode>>,
}

impl Builder {
    fn flatten(
        &mut self,
        component: Component,
        path: String,
    ) -> Result<(usize, ChildSlot), SimulationError> {
        let id = self.models.len();

        match component.kind {
            ComponentKind::Atomic {
                name,
                elapsed,
                cell,
            } => {
                let index = self.atomics.len();
                self.models.push(ModelEntry {
                    path: path.clone(),
                    atomic: Some(index),
                });
                self.atomics
                    .push(AtomicSlot::new(path, cell, elapsed, self.start)?);

                Ok((
                    id,
                    ChildSlot {
                        name,
                        atomics: index..index + 1,
                        coupled: None,
                    },
                ))
            }
            ComponentKind::Coupled(model) => {
                let CoupledModel {
                    name,
                    children,
                    couplings,
                    select,
                    ..
                } = model;

                self.models.push(ModelEntry {
                    path: path.clone(),
                    atomic: None,
                });

                let first = self.atomics.len();
                let mut ids = Vec::with_capacity(children.len());
                let mut slots = Vec::with_capacity(children.len());
                for child in children {
                    let child_path = format!("{}.{}", path, child.name());
                    let (child_id, slot) = self.flatten(child, child_path)?;
                    ids.push(child_id);
                    slots.push(slot);
                }

                // Couplings were validated on insertion, so child indices are
                // in range.
                for coupling in couplings {
                    let source = match coupling.source.owner {
                        Owner::Parent => PortNode::new(id, coupling.source.port, Direction::In),
                        Owner::Child(i) => {
                            PortNode::new(ids[i], coupling.source.port, Direction::Out)
                        }
                    };
                    let sink = match coupling.sink.owner {
                        Owner::Parent => PortNode::new(id, coupling.sink.port, Direction::Out),
                        Owner::Child(i) => PortNode::new(ids[i], coupling.sink.port, Direction::In),
                    };
                    self.edges.entry(source).or_default().push(sink);
                }

                let index = self.coupled.len();
                self.coupled.push(CoupledSlot {
                    path,
                    children: slots,
                    select,
                });

                Ok((
                    id,
                    ChildSlot {
                        name,
                        atomics: first..self.atomics.len(),
                        coupled: Some(index),
                    },
                ))
            }
        }
    }

    fn is_pass_through(&self, node: PortNode) -> bool {
        self.models[node.model].atomic.is_none()
    }

    fn port_name(&self, node: PortNode) -> String {
        format!("{}.{}", self.models[node.model].path, node.port)
    }

    /// Rejects loops made of pass-through ports only.
    fn check_pass_through_cycles(&self) -> Result<(), StructuralCycleError> {
        let mut done = BTreeSet::new();

        for &start in self.edges.keys() {
            if !self.is_pass_through(start) || done.contains(&start) {
                continue;
            }

            let mut stack = vec![(start, 0usize)];
            let mut on_stack = BTreeSet::from([start]);

            while let Some(&(node, next)) = stack.last() {
                let successor = self.edges.get(&node).and_then(|s| s.get(next)).copied();

                let Some(successor) = successor else {
                    stack.pop();
                    on_stack.remove(&node);
                    done.insert(node);
                    continue;
                };
                if let Some(top) = stack.last_mut() {
                    top.1 += 1;
                }
                if !self.is_pass_through(successor) || done.contains(&successor) {
                    continue;
                }
                if on_stack.contains(&successor) {
                    let from = stack
                        .iter()
                        .position(|(n, _)| *n == successor)
                        .unwrap_or(0);
                    let mut ports: Vec<_> =
                        stack[from..].iter().map(|(n, _)| self.port_name(*n)).collect();
                    ports.push(self.port_name(successor));

                    return Err(StructuralCycleError { ports });
                }
                on_stack.insert(successor);
                stack.push((successor, 0));
            }
        }

        Ok(())
    }

    /// Follows couplings from a port down to atomic input ports.
    ///
    /// Pass-through loops must have been ruled out beforehand.
    fn resolve(&self, origin: PortNode) -> Result<Vec<Destination>, StructuralCycleError> {
        let mut destinations = Vec::new();
        let mut work = vec![vec![origin]];

        while let Some(trail) = work.pop() {
            let Some(&node) = trail.last() else {
                continue;
            };

            for &successor in self.edges.get(&node).into_iter().flatten() {
                match self.models[successor.model].atomic {
                    Some(_) if successor.model == origin.model => {
                        let ports = trail
                            .iter()
                            .chain([&successor, &origin])
                            .map(|n| self.port_name(*n))
                            .collect();

                        return Err(StructuralCycleError { ports });
                    }
                    Some(atomic) => destinations.push(Destination {
                        atomic,
                        port: successor.port,
                    }),
                    None => {
                        let mut next = trail.clone();
                        next.push(successor);
                        work.push(next);
                    }
                }
            }
        }
        destinations.sort();

        Ok(destinations)
    }
}
