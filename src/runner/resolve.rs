//! Dependency resolution
//!
//! Turns a requested task into an [`ExecutionPlan`]: every reachable
//! prerequisite exactly once, prerequisites before dependents, each with its
//! staleness decided up front.

use crate::config::Layout;
use crate::error::{ResolveError, ResolveResult};
use crate::runner::{RuleStore, Task};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Why a task does or does not need to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staleness {
    /// Phony tasks always run
    Phony,
    /// The output file does not exist
    MissingOutput,
    /// A file-backed prerequisite runs in this plan
    PrerequisiteRebuilt(String),
    /// A prerequisite's output is newer than this task's output
    NewerPrerequisite(String),
    /// A source file is newer than this task's output
    NewerSource(PathBuf),
    /// The output is current
    UpToDate,
}

impl Staleness {
    /// Whether the task has to run
    pub fn is_stale(&self) -> bool {
        !matches!(self, Staleness::UpToDate)
    }
}

impl fmt::Display for Staleness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Staleness::Phony => write!(f, "phony task"),
            Staleness::MissingOutput => write!(f, "output does not exist"),
            Staleness::PrerequisiteRebuilt(id) => write!(f, "prerequisite '{}' is rebuilt", id),
            Staleness::NewerPrerequisite(id) => {
                write!(f, "output of prerequisite '{}' is newer", id)
            }
            Staleness::NewerSource(path) => write!(f, "source {} is newer", path.display()),
            Staleness::UpToDate => write!(f, "up to date"),
        }
    }
}

/// A task scheduled by the plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTask {
    pub id: String,
    pub staleness: Staleness,
}

/// Ordered, duplicate-free list of tasks for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    requested: String,
    tasks: Vec<PlannedTask>,
}

impl ExecutionPlan {
    /// The task named by the invocation (always the last entry)
    pub fn requested(&self) -> &str {
        &self.requested
    }

    /// Planned tasks in execution order
    pub fn tasks(&self) -> &[PlannedTask] {
        &self.tasks
    }

    /// Task identifiers in execution order
    pub fn ids(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.id.as_str()).collect()
    }

    /// Number of tasks that will run
    pub fn stale_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.staleness.is_stale()).count()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Resolve the plan for `requested`
///
/// Fails with [`ResolveError::UnknownTask`] if the task or any reachable
/// prerequisite is undeclared and with [`ResolveError::CyclicDependency`]
/// if a cycle is reachable. No partial plan is returned on error.
pub fn resolve(store: &RuleStore, requested: &str, layout: &Layout) -> ResolveResult<ExecutionPlan> {
    let mut resolver = Resolver {
        store,
        layout,
        marks: HashMap::new(),
        stack: Vec::new(),
        rebuilt: HashSet::new(),
        planned: Vec::new(),
    };
    resolver.visit(requested, None)?;

    Ok(ExecutionPlan {
        requested: requested.to_string(),
        tasks: resolver.planned,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

struct Resolver<'a> {
    store: &'a RuleStore,
    layout: &'a Layout,
    marks: HashMap<String, Mark>,
    stack: Vec<String>,
    /// File-backed tasks scheduled to run
    rebuilt: HashSet<String>,
    planned: Vec<PlannedTask>,
}

impl<'a> Resolver<'a> {
    fn visit(&mut self, id: &str, required_by: Option<&str>) -> ResolveResult<()> {
        match self.marks.get(id) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => return Err(self.cycle_error(id)),
            None => {}
        }

        // Placeholders left by argument capture are never resolvable
        let store = self.store;
        let task = store
            .get(id)
            .ok()
            .filter(|task| !task.is_synthesized())
            .ok_or_else(|| ResolveError::UnknownTask {
                name: id.to_string(),
                required_by: required_by.map(str::to_string),
            })?;

        self.marks.insert(id.to_string(), Mark::Visiting);
        self.stack.push(id.to_string());

        for prerequisite in &task.prerequisites {
            self.visit(prerequisite, Some(id))?;
        }

        self.stack.pop();
        self.marks.insert(id.to_string(), Mark::Done);

        let staleness = self.staleness(task);
        if staleness.is_stale() && !task.phony {
            self.rebuilt.insert(id.to_string());
        }
        self.planned.push(PlannedTask {
            id: id.to_string(),
            staleness,
        });

        Ok(())
    }

    fn cycle_error(&self, id: &str) -> ResolveError {
        let start = self.stack.iter().position(|s| s == id).unwrap_or(0);
        let mut cycle: Vec<&str> = self.stack[start..].iter().map(String::as_str).collect();
        cycle.push(id);
        ResolveError::CyclicDependency(cycle.join(" -> "))
    }

    fn staleness(&self, task: &Task) -> Staleness {
        let output = match (&task.output, task.phony) {
            (Some(output), false) => self.layout.resolve(output),
            _ => return Staleness::Phony,
        };

        let Some(built) = modified(&output) else {
            return Staleness::MissingOutput;
        };

        for prerequisite in &task.prerequisites {
            if self.rebuilt.contains(prerequisite) {
                return Staleness::PrerequisiteRebuilt(prerequisite.clone());
            }

            let Ok(pre) = self.store.get(prerequisite) else {
                continue;
            };
            let Some(pre_output) = pre.output.as_ref().filter(|_| !pre.phony) else {
                continue;
            };
            if modified(&self.layout.resolve(pre_output)).is_some_and(|t| t > built) {
                return Staleness::NewerPrerequisite(prerequisite.clone());
            }
        }

        for pattern in &task.sources {
            if let Some(path) = self.newer_source(pattern, built) {
                return Staleness::NewerSource(path);
            }
        }

        Staleness::UpToDate
    }

    fn newer_source(&self, pattern: &str, built: SystemTime) -> Option<PathBuf> {
        let full_pattern = if Path::new(pattern).is_absolute() {
            pattern.to_string()
        } else {
            let root = glob::Pattern::escape(&self.layout.root.display().to_string());
            format!("{}/{}", root.trim_end_matches('/'), pattern)
        };

        glob::glob(&full_pattern)
            .ok()?
            .flatten()
            .find(|path| modified(path).is_some_and(|t| t > built))
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::runner::{Step, Task};
    use std::fs::File;
    use std::time::Duration;
    use tempfile::TempDir;

    fn layout(dir: &TempDir) -> Layout {
        Layout::new(dir.path(), &Settings::default())
    }

    fn touch(path: &Path, age_secs: u64) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let file = File::create(path).unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(age_secs))
            .unwrap();
    }

    fn lifecycle_store() -> RuleStore {
        let mut store = RuleStore::new();
        for task in [
            Task::phony("init-environment", &[], vec![Step::command("true")]),
            Task::phony("test", &["init-environment"], vec![Step::command("true")]),
            Task::phony("dist", &["test"], vec![Step::command("true")]),
            Task::phony("install", &["dist"], vec![Step::command("true")]),
        ] {
            store.declare(task).unwrap();
        }
        store
    }

    #[test]
    fn test_plan_orders_prerequisites_first() {
        let dir = TempDir::new().unwrap();
        let plan = resolve(&lifecycle_store(), "install", &layout(&dir)).unwrap();

        assert_eq!(plan.ids(), vec!["init-environment", "test", "dist", "install"]);
        assert_eq!(plan.requested(), "install");
        assert_eq!(plan.stale_count(), 4);
    }

    #[test]
    fn test_shared_prerequisite_planned_once() {
        let dir = TempDir::new().unwrap();
        let mut store = RuleStore::new();
        store.declare(Task::phony("env", &[], vec![])).unwrap();
        store.declare(Task::phony("lint", &["env"], vec![])).unwrap();
        store.declare(Task::phony("test", &["env"], vec![])).unwrap();
        store
            .declare(Task::phony("check", &["lint", "test", "env"], vec![]))
            .unwrap();

        let plan = resolve(&store, "check", &layout(&dir)).unwrap();
        assert_eq!(plan.ids(), vec!["env", "lint", "test", "check"]);
    }

    #[test]
    fn test_cycle_is_reported() {
        let dir = TempDir::new().unwrap();
        let mut store = RuleStore::new();
        store.declare(Task::phony("a", &["b"], vec![])).unwrap();
        store.declare(Task::phony("b", &["c"], vec![])).unwrap();
        store.declare(Task::phony("c", &["a"], vec![])).unwrap();
        store.declare(Task::phony("top", &["a"], vec![])).unwrap();

        let result = resolve(&store, "top", &layout(&dir));
        assert_eq!(
            result,
            Err(ResolveError::CyclicDependency("a -> b -> c -> a".to_string()))
        );
    }

    #[test]
    fn test_unreachable_cycle_is_ignored() {
        let dir = TempDir::new().unwrap();
        let mut store = lifecycle_store();
        store.declare(Task::phony("x", &["y"], vec![])).unwrap();
        store.declare(Task::phony("y", &["x"], vec![])).unwrap();

        assert!(resolve(&store, "test", &layout(&dir)).is_ok());
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let dir = TempDir::new().unwrap();
        let mut store = lifecycle_store();
        store.declare(Task::phony("loop", &["loop"], vec![])).unwrap();

        assert_eq!(
            resolve(&store, "loop", &layout(&dir)),
            Err(ResolveError::CyclicDependency("loop -> loop".to_string()))
        );
        assert!(resolve(&store, "install", &layout(&dir)).is_ok());
    }

    #[test]
    fn test_unknown_prerequisite_names_dependent() {
        let dir = TempDir::new().unwrap();
        let mut store = RuleStore::new();
        store.declare(Task::phony("docs", &["sphinx"], vec![])).unwrap();

        assert_eq!(
            resolve(&store, "docs", &layout(&dir)),
            Err(ResolveError::UnknownTask {
                name: "sphinx".to_string(),
                required_by: Some("docs".to_string()),
            })
        );
        assert!(matches!(
            resolve(&store, "nope", &layout(&dir)),
            Err(ResolveError::UnknownTask { required_by: None, .. })
        ));
    }

    #[test]
    fn test_placeholders_are_not_resolvable() {
        let dir = TempDir::new().unwrap();
        let mut store = RuleStore::new();
        store.declare(Task::phony("docs", &["sphinx"], vec![])).unwrap();
        store.synthesize("sphinx");
        store.synthesize("mymodule");

        assert!(matches!(
            resolve(&store, "docs", &layout(&dir)),
            Err(ResolveError::UnknownTask { name, .. }) if name == "sphinx"
        ));
        assert!(matches!(
            resolve(&store, "mymodule", &layout(&dir)),
            Err(ResolveError::UnknownTask { name, .. }) if name == "mymodule"
        ));
    }

    #[test]
    fn test_missing_output_is_stale() {
        let dir = TempDir::new().unwrap();
        let mut store = RuleStore::new();
        store
            .declare(Task::phony("env", &[], vec![]).with_output("env/bin/python"))
            .unwrap();

        let plan = resolve(&store, "env", &layout(&dir)).unwrap();
        assert_eq!(plan.tasks()[0].staleness, Staleness::MissingOutput);
    }

    #[test]
    fn test_existing_output_is_up_to_date() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("env/bin/python"), 10);
        let mut store = RuleStore::new();
        store
            .declare(Task::phony("env", &[], vec![]).with_output("env/bin/python"))
            .unwrap();

        let plan = resolve(&store, "env", &layout(&dir)).unwrap();
        assert_eq!(plan.tasks()[0].staleness, Staleness::UpToDate);
        assert_eq!(plan.stale_count(), 0);
    }

    #[test]
    fn test_newer_prerequisite_output() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("env/bin/python"), 10);
        touch(&dir.path().join("env/.requirements"), 100);
        let mut store = RuleStore::new();
        store
            .declare(Task::phony("env", &[], vec![]).with_output("env/bin/python"))
            .unwrap();
        store
            .declare(Task::phony("reqs", &["env"], vec![]).with_output("env/.requirements"))
            .unwrap();

        let plan = resolve(&store, "reqs", &layout(&dir)).unwrap();
        assert_eq!(plan.tasks()[0].staleness, Staleness::UpToDate);
        assert_eq!(
            plan.tasks()[1].staleness,
            Staleness::NewerPrerequisite("env".to_string())
        );
    }

    #[test]
    fn test_rebuilt_prerequisite_makes_dependent_stale() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("env/.requirements"), 10);
        let mut store = RuleStore::new();
        store
            .declare(Task::phony("env", &[], vec![]).with_output("env/bin/python"))
            .unwrap();
        store
            .declare(Task::phony("reqs", &["env"], vec![]).with_output("env/.requirements"))
            .unwrap();

        let plan = resolve(&store, "reqs", &layout(&dir)).unwrap();
        assert_eq!(
            plan.tasks()[1].staleness,
            Staleness::PrerequisiteRebuilt("env".to_string())
        );
    }

    #[test]
    fn test_phony_prerequisite_does_not_force_rebuild() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("stamp"), 10);
        let mut store = RuleStore::new();
        store.declare(Task::phony("announce", &[], vec![])).unwrap();
        store
            .declare(Task::phony("stamp", &["announce"], vec![]).with_output("stamp"))
            .unwrap();

        let plan = resolve(&store, "stamp", &layout(&dir)).unwrap();
        assert_eq!(plan.tasks()[0].staleness, Staleness::Phony);
        assert_eq!(plan.tasks()[1].staleness, Staleness::UpToDate);
    }

    #[test]
    fn test_newer_source_makes_task_stale() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("stamp"), 100);
        touch(&dir.path().join("requirements.txt"), 10);
        touch(&dir.path().join("requirements-dev.txt"), 1000);
        let mut store = RuleStore::new();
        store
            .declare(
                Task::phony("reqs", &[], vec![])
                    .with_output("stamp")
                    .with_sources(&["requirements*.txt"]),
            )
            .unwrap();

        let plan = resolve(&store, "reqs", &layout(&dir)).unwrap();
        assert_eq!(
            plan.tasks()[0].staleness,
            Staleness::NewerSource(dir.path().join("requirements.txt"))
        );
    }

    #[test]
    fn test_older_sources_keep_task_current() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("stamp"), 10);
        touch(&dir.path().join("requirements.txt"), 100);
        let mut store = RuleStore::new();
        store
            .declare(
                Task::phony("reqs", &[], vec![])
                    .with_output("stamp")
                    .with_sources(&["requirements*.txt", "missing/*.txt"]),
            )
            .unwrap();

        let plan = resolve(&store, "reqs", &layout(&dir)).unwrap();
        assert!(!plan.tasks()[0].staleness.is_stale());
    }
}
