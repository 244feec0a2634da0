use crate::config::MapperConfig;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Decides which paths under a workspace root are skipped.
///
/// Checks run in order: the default skip set, the hidden-directory rule, the
/// root ignore file, then ignore files of every tracked ancestor directory.
/// Nested ignore files are only known once [`IgnoreResolver::track_directory`]
/// has been called for their directory, so a walk must track each directory
/// before asking about its children.
pub struct IgnoreResolver {
    root: PathBuf,
    root_rules: Option<Gitignore>,
    nested_rules: HashMap<PathBuf, Gitignore>,
    skip_dirs: HashSet<String>,
    allowed_hidden_dirs: HashSet<String>,
    ignored_file_names: HashSet<String>,
    ignore_file_name: String,
}

impl IgnoreResolver {
    pub fn new(root: &Path, config: &MapperConfig) -> Self {
        let root_rules = compile(root, &config.ignore_file_name);
        if root_rules.is_some() {
            tracing::debug!("Loaded root {} in {}", config.ignore_file_name, root.display());
        }

        Self {
            root: root.to_path_buf(),
            root_rules,
            nested_rules: HashMap::new(),
            skip_dirs: config.skip_dirs.clone(),
            allowed_hidden_dirs: config.allowed_hidden_dirs.clone(),
            ignored_file_names: config.ignored_file_names.clone(),
            ignore_file_name: config.ignore_file_name.clone(),
        }
    }

    /// Load the ignore file of a directory the walk is entering, if it has one.
    pub fn track_directory(&mut self, dir: &Path) {
        let dir = self.absolute(dir);
        if dir == self.root || self.nested_rules.contains_key(&dir) {
            return;
        }
        if let Some(rules) = compile(&dir, &self.ignore_file_name) {
            tracing::debug!("Loaded nested {} in {}", self.ignore_file_name, dir.display());
            self.nested_rules.insert(dir, rules);
        }
    }

    /// `path` may be absolute or relative to the root.
    pub fn should_ignore(&self, path: &Path, is_dir: bool) -> bool {
        let path = self.absolute(path);
        let rel = match path.strip_prefix(&self.root) {
            Ok(rel) => rel,
            Err(_) => return false,
        };
        if rel.as_os_str().is_empty() {
            return false;
        }

        let base = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if is_dir {
            if self.skip_dirs.contains(&base) {
                return true;
            }
            if base.starts_with('.') && !self.allowed_hidden_dirs.contains(&base) {
                return true;
            }
        } else if self.ignored_file_names.contains(&base) {
            return true;
        }

        if let Some(rules) = &self.root_rules {
            if rules.matched(rel, is_dir).is_ignore() {
                return true;
            }
        }

        // Each nested file sees paths relative to its own directory
        for ancestor in path.ancestors().skip(1) {
            if ancestor == self.root || !ancestor.starts_with(&self.root) {
                break;
            }
            if let Some(rules) = self.nested_rules.get(ancestor) {
                if let Ok(sub_rel) = path.strip_prefix(ancestor) {
                    if rules.matched(sub_rel, is_dir).is_ignore() {
                        return true;
                    }
                }
            }
        }

        false
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

/// Compile `<dir>/<file_name>`, or `None` if it is absent or unreadable.
fn compile(dir: &Path, file_name: &str) -> Option<Gitignore> {
    let path = dir.join(file_name);
    if !path.is_file() {
        return None;
    }

    let mut builder = GitignoreBuilder::new(dir);
    if let Some(err) = builder.add(&path) {
        tracing::warn!("Problem reading {}: {}", path.display(), err);
    }
    match builder.build() {
        Ok(rules) if !rules.is_empty() => Some(rules),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!("Failed to compile {}: {}", path.display(), e);
            None
        }
    }
}
