//! Applies registered passes until a domain stops changing.

use crate::{
    error::PlannerError,
    optimizer::{
        config::OptimizerConfig,
        context::PassContext,
        registry::{MergeRule, MergeScope, PassRegistry, sort_children},
    },
    schema::{catalog::Catalog, entity::Entity},
};
use domain_syntax::{Condition, Domain, Nary, NaryKind, OptLevel};
use model::core::identifiers::EntityName;
use std::fmt;
use tracing::{debug, warn};

/// A domain together with the entity and level it was optimized for.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizedDomain {
    domain: Domain,
    entity: EntityName,
    level: OptLevel,
}

impl OptimizedDomain {
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn entity(&self) -> &EntityName {
        &self.entity
    }

    pub fn level(&self) -> OptLevel {
        self.level
    }

    pub fn into_domain(self) -> Domain {
        self.domain
    }

    /// Fails unless the domain was optimized at `level` or above.
    pub fn require_level(&self, level: OptLevel) -> Result<(), PlannerError> {
        if self.level < level {
            return Err(PlannerError::NotOptimized {
                entity: self.entity.to_string(),
                actual: self.level,
                required: level,
            });
        }
        Ok(())
    }
}

impl fmt::Display for OptimizedDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.domain)
    }
}

/// Outcome of one rewrite step on a node.
enum Step {
    Done(Domain),
    Rewritten(Domain),
}

#[derive(Debug, Clone, Default)]
pub struct Optimizer {
    registry: PassRegistry,
    config: OptimizerConfig,
}

impl Optimizer {
    pub fn new(registry: PassRegistry) -> Self {
        Self {
            registry,
            config: OptimizerConfig::default(),
        }
    }

    pub fn with_config(registry: PassRegistry, config: OptimizerConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &PassRegistry {
        &self.registry
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Optimizes `domain` against `entity`, running every pass registered
    /// at `level` or below.
    pub fn optimize(
        &self,
        domain: Domain,
        entity: &Entity,
        catalog: &dyn Catalog,
        level: OptLevel,
    ) -> Result<OptimizedDomain, PlannerError> {
        let ctx = PassContext::new(self, entity, catalog, level);
        let domain = self.optimize_node(domain, &ctx)?;

        debug!(
            "Optimized domain for '{}' at level {}: {}",
            entity.name, level, domain
        );

        Ok(OptimizedDomain {
            domain,
            entity: entity.name.clone(),
            level,
        })
    }

    pub(crate) fn optimize_node(
        &self,
        domain: Domain,
        ctx: &PassContext<'_>,
    ) -> Result<Domain, PlannerError> {
        let mut current = domain;
        let mut rewrites = 0;

        loop {
            if let Some(mark) = current.mark() {
                if mark.covers(&ctx.entity.name, ctx.level) {
                    return Ok(current);
                }
                if mark.entity != ctx.entity.name {
                    warn!(
                        "Domain {} was optimized for '{}' and is now optimized for '{}'",
                        current, mark.entity, ctx.entity.name
                    );
                }
            }

            match self.step(current, ctx)? {
                Step::Done(domain) => return Ok(domain),
                Step::Rewritten(domain) => {
                    rewrites = tick(rewrites, ctx)?;
                    current = domain;
                }
            }
        }
    }

    fn step(&self, domain: Domain, ctx: &PassContext<'_>) -> Result<Step, PlannerError> {
        match domain {
            Domain::Constant(_) => Ok(Step::Done(domain)),
            Domain::Not(inner) => {
                let inner = self.optimize_node(*inner, ctx)?;
                match !inner {
                    negated @ (Domain::Not(_) | Domain::Constant(_)) => Ok(Step::Done(negated)),
                    negated => Ok(Step::Rewritten(negated)),
                }
            }
            Domain::And(nary) => self.step_nary(NaryKind::And, nary, ctx),
            Domain::Or(nary) => self.step_nary(NaryKind::Or, nary, ctx),
            Domain::Condition(condition) => self.step_condition(condition, ctx),
        }
    }

    fn step_condition(
        &self,
        condition: Condition,
        ctx: &PassContext<'_>,
    ) -> Result<Step, PlannerError> {
        let (head, _) = condition.split_path();
        let field_type = ctx.entity.field(head).map(|f| f.field_type);

        for level in ctx.level.up_to() {
            for pass in self
                .registry
                .condition_passes(level, condition.operator, field_type)
            {
                if let Some(rewritten) = (pass.pass)(&condition, ctx)? {
                    debug!(
                        "Pass '{}' rewrote {} into {}",
                        pass.name, condition, rewritten
                    );
                    return Ok(Step::Rewritten(rewritten));
                }
            }
        }

        Ok(Step::Done(Domain::Condition(condition.with_mark(ctx.mark()))))
    }

    /// Optimizes children, flattens, sorts and merges until the child count
    /// stops shrinking.
    fn step_nary(
        &self,
        kind: NaryKind,
        nary: Nary,
        ctx: &PassContext<'_>,
    ) -> Result<Step, PlannerError> {
        let mut children = nary.into_children();
        let mut rounds = 0;

        loop {
            let rebuilt = self.rebuild(kind, children, ctx)?;
            if rebuilt.nary_kind() != Some(kind) {
                // Folded into a constant or a single child, both already optimized.
                return Ok(Step::Done(rebuilt));
            }

            let sorted = rebuilt.children().to_vec();
            let merged = self.apply_merges(kind, sorted.clone(), ctx)?;
            if merged == sorted {
                return Ok(Step::Done(rebuilt.with_mark(ctx.mark())));
            }
            if merged.len() >= sorted.len() {
                debug!(
                    "Merges rewrote {} node without shrinking it, keeping {} children",
                    kind.token(),
                    merged.len()
                );
                return Ok(Step::Done(self.rebuild(kind, merged, ctx)?.with_mark(ctx.mark())));
            }

            debug!(
                "Merged {} children of {} node into {}",
                sorted.len(),
                kind.token(),
                merged.len()
            );
            rounds = tick(rounds, ctx)?;
            children = merged;
        }
    }

    /// Optimizes `children` and rebuilds the node with its children sorted.
    fn rebuild(
        &self,
        kind: NaryKind,
        children: Vec<Domain>,
        ctx: &PassContext<'_>,
    ) -> Result<Domain, PlannerError> {
        let optimized = children
            .into_iter()
            .map(|child| self.optimize_node(child, ctx))
            .collect::<Result<Vec<_>, _>>()?;

        let rebuilt = kind.apply(optimized);
        if rebuilt.nary_kind() != Some(kind) {
            return Ok(rebuilt);
        }
        let mut sorted = rebuilt.children().to_vec();
        sort_children(&mut sorted);
        Ok(kind.apply(sorted))
    }

    fn apply_merges(
        &self,
        kind: NaryKind,
        mut children: Vec<Domain>,
        ctx: &PassContext<'_>,
    ) -> Result<Vec<Domain>, PlannerError> {
        for level in ctx.level.up_to() {
            for rule in self.registry.merge_rules(level) {
                children = match rule.scope {
                    MergeScope::Children => (rule.pass)(kind, children, ctx)?,
                    MergeScope::FieldRun { .. } => merge_runs(rule, kind, children, ctx)?,
                };
            }
        }
        Ok(children)
    }
}

/// Counts one more rewrite of the same node against the configured cap.
fn tick(rewrites: usize, ctx: &PassContext<'_>) -> Result<usize, PlannerError> {
    let max = ctx.max_iterations();
    if rewrites >= max {
        return Err(PlannerError::OptimizationDiverged(max));
    }
    Ok(rewrites + 1)
}

/// Hands each run of adjacent same-field conditions to the rule's pass.
fn merge_runs(
    rule: &MergeRule,
    kind: NaryKind,
    children: Vec<Domain>,
    ctx: &PassContext<'_>,
) -> Result<Vec<Domain>, PlannerError> {
    let mut out = Vec::with_capacity(children.len());
    let mut iter = children.into_iter().peekable();

    while let Some(child) = iter.next() {
        let Some(key) = rule.scope.run_key(&child) else {
            out.push(child);
            continue;
        };

        let mut run = vec![child];
        while let Some(next) = iter.next_if(|next| rule.scope.run_key(next).as_deref() == Some(&key)) {
            run.push(next);
        }

        let head = key.split('.').next().unwrap_or(&key);
        let field_type = ctx.entity.field(head).map(|f| f.field_type);
        if run.len() > 1 && rule.scope.accepts_type(field_type) {
            out.extend((rule.pass)(kind, run, ctx)?);
        } else {
            out.extend(run);
        }
    }

    Ok(out)
}
