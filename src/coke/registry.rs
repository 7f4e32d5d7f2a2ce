//! Task storage, alias derivation and invocation.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::optparse::Options;
use crate::error::CokeError;

/// What a task does when invoked. Actions get the registry so they can
/// invoke other tasks.
pub type Action = Rc<dyn Fn(&TaskRegistry, &Options) -> Result<(), CokeError>>;

#[derive(Clone)]
pub struct Task {
    pub name: String,
    pub description: String,
    pub action: Action,
    pub alias_key: String,
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("alias_key", &self.alias_key)
            .finish_non_exhaustive()
    }
}

/// First character of every word in `name`, where words are separated by
/// anything other than alphanumerics and `_`.
#[must_use]
pub fn alias_key(name: &str) -> String {
    name.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter_map(|word| word.chars().next())
        .collect()
}

#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: Vec<Task>,
    by_name: HashMap<String, usize>,
    aliases: HashMap<String, String>,
}

impl TaskRegistry {
    /// Store a task. A second registration under the same name replaces the
    /// first but keeps its listing position.
    pub fn register(&mut self, name: &str, description: Option<&str>, action: Action) {
        let task = Task {
            name: name.to_string(),
            description: description.unwrap_or_default().to_string(),
            action,
            alias_key: alias_key(name),
        };

        if !task.alias_key.is_empty() {
            self.aliases.insert(task.alias_key.clone(), task.name.clone());
        }
        match self.by_name.get(name) {
            Some(&index) => self.tasks[index] = task,
            None => {
                self.by_name.insert(task.name.clone(), self.tasks.len());
                self.tasks.push(task);
            }
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Task> {
        self.by_name.get(name).map(|&index| &self.tasks[index])
    }

    /// Look up by exact name, then by alias.
    #[must_use]
    pub fn resolve(&self, name_or_alias: &str) -> Option<&Task> {
        self.get(name_or_alias).or_else(|| {
            self.aliases
                .get(name_or_alias)
                .and_then(|name| self.get(name))
        })
    }

    #[must_use]
    pub fn alias(&self, key: &str) -> Option<&str> {
        self.aliases.get(key).map(String::as_str)
    }

    /// Run a task by name or alias.
    ///
    /// # Errors
    ///
    /// Returns `CokeError::NoSuchTask` if nothing resolves, otherwise whatever
    /// the action returns.
    pub fn invoke(&self, name_or_alias: &str, options: &Options) -> Result<(), CokeError> {
        let task = self
            .resolve(name_or_alias)
            .ok_or_else(|| CokeError::NoSuchTask(name_or_alias.to_string()))?;
        log::debug!("invoking task {:?}", task.name);
        let action = Rc::clone(&task.action);
        action(self, options)
    }

    /// Tasks in registration order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
