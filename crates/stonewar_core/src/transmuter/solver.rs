//! Bounded integer search over element conversions.
//!
//! One variable per (source, target) pair counts target units produced from
//! the source. Each target's variables must sum to its demand exactly and
//! each source may spend at most its supply. Domains are narrowed by bounds
//! propagation and the cheapest assignment is found by branch and bound.

use crate::composition::Composition;
use crate::element::{Element, ELEMENTS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Domain {
    lo: u32,
    hi: u32,
}

impl Domain {
    const fn is_fixed(self) -> bool {
        self.lo == self.hi
    }
}

/// Units of `target` produced from `source` at `rate` source units each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Variable {
    pub source: Element,
    pub target: Element,
    pub rate: u32,
    initial: Domain,
}

/// A cheapest assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Solution {
    /// Value per variable, in variable order.
    pub values: Vec<u32>,
    /// Total source units spent.
    pub cost: u32,
    /// Search nodes visited.
    pub nodes: u64,
}

#[derive(Debug, Clone)]
pub(super) struct Problem {
    vars: Vec<Variable>,
    supply: [u32; 4],
    demand: [u32; 4],
}

impl Problem {
    /// Build variables for every source with supply and target with demand.
    pub fn new(supply: &Composition, demand: &Composition) -> Self {
        let supply = supply.values().map(u32::from);
        let demand = demand.values().map(u32::from);
        let mut vars = Vec::new();
        for source in ELEMENTS {
            let s = supply[source.index()];
            for target in ELEMENTS {
                let n = demand[target.index()];
                if source == target || s == 0 || n == 0 {
                    continue;
                }
                let rate = source.relation(target).exchange_rate();
                vars.push(Variable {
                    source,
                    target,
                    rate,
                    initial: Domain {
                        lo: 0,
                        hi: n.min(s / rate),
                    },
                });
            }
        }
        Self {
            vars,
            supply,
            demand,
        }
    }

    pub fn variables(&self) -> &[Variable] {
        &self.vars
    }

    /// Cheapest feasible assignment, if any.
    pub fn solve(&self) -> Option<Solution> {
        let domains: Vec<Domain> = self.vars.iter().map(|v| v.initial).collect();
        let mut best: Option<(u32, Vec<u32>)> = None;
        let mut nodes = 0;
        self.search(domains, &mut best, &mut nodes);
        best.map(|(cost, values)| Solution {
            values,
            cost,
            nodes,
        })
    }

    fn search(&self, mut domains: Vec<Domain>, best: &mut Option<(u32, Vec<u32>)>, nodes: &mut u64) {
        *nodes += 1;
        if !self.propagate(&mut domains) {
            return;
        }
        let bound = self.lower_bound(&domains);
        if matches!(best, Some((cost, _)) if bound >= *cost) {
            return;
        }

        let branch = domains
            .iter()
            .enumerate()
            .filter(|(_, d)| !d.is_fixed())
            .min_by_key(|&(i, _)| (self.vars[i].rate, i))
            .map(|(i, _)| i);

        let Some(i) = branch else {
            let values: Vec<u32> = domains.iter().map(|d| d.lo).collect();
            *best = Some((bound, values));
            return;
        };

        let Domain { lo, hi } = domains[i];
        for value in (lo..=hi).rev() {
            let mut child = domains.clone();
            child[i] = Domain { lo: value, hi: value };
            self.search(child, best, nodes);
        }
    }

    /// Narrow domains to a fixpoint. Returns false when infeasible.
    fn propagate(&self, domains: &mut [Domain]) -> bool {
        loop {
            let mut changed = false;

            for target in ELEMENTS {
                let need = self.demand[target.index()];
                if need == 0 {
                    continue;
                }
                let members: Vec<usize> = self.indices(|v| v.target == target);
                let sum_lo: u32 = members.iter().map(|&i| domains[i].lo).sum();
                let sum_hi: u32 = members.iter().map(|&i| domains[i].hi).sum();
                if sum_lo > need || sum_hi < need {
                    return false;
                }
                for &i in &members {
                    let d = domains[i];
                    let lo = d.lo.max(need.saturating_sub(sum_hi - d.hi));
                    let hi = d.hi.min(need - (sum_lo - d.lo));
                    if (lo, hi) != (d.lo, d.hi) {
                        domains[i] = Domain { lo, hi };
                        changed = true;
                    }
                }
            }

            for source in ELEMENTS {
                let supply = self.supply[source.index()];
                let members: Vec<usize> = self.indices(|v| v.source == source);
                if members.is_empty() {
                    continue;
                }
                let spent: u32 = members
                    .iter()
                    .map(|&i| self.vars[i].rate * domains[i].lo)
                    .sum();
                if spent > supply {
                    return false;
                }
                for &i in &members {
                    let d = domains[i];
                    let rate = self.vars[i].rate;
                    let slack = supply - (spent - rate * d.lo);
                    let hi = d.hi.min(slack / rate);
                    if hi != d.hi {
                        domains[i].hi = hi;
                        changed = true;
                    }
                }
            }

            if domains.iter().any(|d| d.lo > d.hi) {
                return false;
            }
            if !changed {
                return true;
            }
        }
    }

    /// Cost of the fixed part plus the cheapest way to cover what is left.
    fn lower_bound(&self, domains: &[Domain]) -> u32 {
        let mut bound: u32 = self
            .vars
            .iter()
            .zip(domains)
            .map(|(v, d)| v.rate * d.lo)
            .sum();
        for target in ELEMENTS {
            let members = self.indices(|v| v.target == target);
            let covered: u32 = members.iter().map(|&i| domains[i].lo).sum();
            let remaining = self.demand[target.index()].saturating_sub(covered);
            let cheapest = members
                .iter()
                .filter(|&&i| !domains[i].is_fixed())
                .map(|&i| self.vars[i].rate)
                .min()
                .unwrap_or(0);
            bound += remaining * cheapest;
        }
        bound
    }

    fn indices(&self, pred: impl Fn(&Variable) -> bool) -> Vec<usize> {
        self.vars
            .iter()
            .enumerate()
            .filter(|(_, v)| pred(v))
            .map(|(i, _)| i)
            .collect()
    }
}
