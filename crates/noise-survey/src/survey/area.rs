//! Area addressing for the three-level survey tree.
//!
//! Every per-area map in a survey is keyed by an [`AreaKey`], whose text form is
//! the JSON object `{"main":0,"sub":1,"ss":2}` with fields always emitted in that
//! order. Decoding accepts any field order, so keys written by other clients
//! still land on the same entry.

use super::domain::{Area, SurveyData};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AreaError {
    #[error("no area exists at {0}")]
    NotFound(AreaKey),
    #[error("invalid area key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },
}

/// Position of a node in the area tree.
///
/// Ordering is main, then sub, then sub-sub, with a parent sorting before its
/// children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AreaPath {
    pub main: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ss: Option<usize>,
}

impl AreaPath {
    pub const fn main(main: usize) -> Self {
        Self {
            main,
            sub: None,
            ss: None,
        }
    }

    pub const fn sub(main: usize, sub: usize) -> Self {
        Self {
            main,
            sub: Some(sub),
            ss: None,
        }
    }

    pub const fn sub_sub(main: usize, sub: usize, ss: usize) -> Self {
        Self {
            main,
            sub: Some(sub),
            ss: Some(ss),
        }
    }

    pub fn key(&self) -> AreaKey {
        AreaKey(*self)
    }

    pub fn level(&self) -> usize {
        match (self.sub, self.ss) {
            (None, _) => 0,
            (Some(_), None) => 1,
            (Some(_), Some(_)) => 2,
        }
    }

    pub fn index_at(&self, level: usize) -> Option<usize> {
        match level {
            0 => Some(self.main),
            1 => self.sub,
            2 => self.sub.and(self.ss),
            _ => None,
        }
    }

    pub fn child(&self, index: usize) -> Option<Self> {
        match (self.sub, self.ss) {
            (None, _) => Some(Self::sub(self.main, index)),
            (Some(sub), None) => Some(Self::sub_sub(self.main, sub, index)),
            (Some(_), Some(_)) => None,
        }
    }

    fn with_index(mut self, level: usize, index: usize) -> Self {
        match level {
            0 => self.main = index,
            1 => self.sub = Some(index),
            _ => self.ss = Some(index),
        }
        self
    }

    fn shares_ancestors_with(&self, other: &Self, level: usize) -> bool {
        (0..level).all(|l| self.index_at(l) == other.index_at(l))
    }

    /// Where this path lands once the node at `removed` is deleted from the tree.
    ///
    /// `None` means the path addressed the removed node or one of its
    /// descendants. Later siblings of the removed node, and everything under
    /// them, move down by one; every other path is unchanged.
    pub fn shift_after_removal(&self, removed: &AreaPath) -> Option<Self> {
        let level = removed.level();
        if self.level() < level || !self.shares_ancestors_with(removed, level) {
            return Some(*self);
        }

        let (Some(index), Some(removed_index)) = (self.index_at(level), removed.index_at(level))
        else {
            return Some(*self);
        };

        match index.cmp(&removed_index) {
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Greater => Some(self.with_index(level, index - 1)),
            std::cmp::Ordering::Less => Some(*self),
        }
    }

    pub fn resolve<'a>(&self, areas: &'a [Area]) -> Option<&'a Area> {
        let main = areas.get(self.main)?;
        let Some(sub_index) = self.sub else {
            return Some(main);
        };
        let sub = main.sub_areas.get(sub_index)?;
        match self.ss {
            None => Some(sub),
            Some(ss_index) => sub.sub_areas.get(ss_index),
        }
    }

    /// "Main > Sub > Sub-sub" style name, or `None` if the path is stale.
    pub fn display_name(&self, areas: &[Area]) -> Option<String> {
        let mut names = Vec::with_capacity(3);
        let main = areas.get(self.main)?;
        names.push(main.name.as_str());
        if let Some(sub_index) = self.sub {
            let sub = main.sub_areas.get(sub_index)?;
            names.push(sub.name.as_str());
            if let Some(ss_index) = self.ss {
                names.push(sub.sub_areas.get(ss_index)?.name.as_str());
            }
        }
        Some(names.join(" > "))
    }
}

/// Canonical map key for an [`AreaPath`]. Serializes as its JSON text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AreaKey(AreaPath);

impl AreaKey {
    pub fn path(&self) -> AreaPath {
        self.0
    }

    pub fn encode(&self) -> String {
        let AreaPath { main, sub, ss } = self.0;
        match (sub, ss) {
            (None, _) => format!("{{\"main\":{main}}}"),
            (Some(sub), None) => format!("{{\"main\":{main},\"sub\":{sub}}}"),
            (Some(sub), Some(ss)) => format!("{{\"main\":{main},\"sub\":{sub},\"ss\":{ss}}}"),
        }
    }

    pub fn decode(raw: &str) -> Result<Self, AreaError> {
        let path: AreaPath =
            serde_json::from_str(raw.trim()).map_err(|err| AreaError::InvalidKey {
                key: raw.to_string(),
                reason: err.to_string(),
            })?;

        if path.ss.is_some() && path.sub.is_none() {
            return Err(AreaError::InvalidKey {
                key: raw.to_string(),
                reason: "sub-sub index given without a sub index".to_string(),
            });
        }

        Ok(Self(path))
    }
}

impl From<AreaPath> for AreaKey {
    fn from(path: AreaPath) -> Self {
        Self(path)
    }
}

impl fmt::Display for AreaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl Serialize for AreaKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for AreaKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        AreaKey::decode(&raw).map_err(serde::de::Error::custom)
    }
}

/// Map from area to per-area survey data.
pub type AreaMap<T> = BTreeMap<AreaKey, T>;

/// Re-key a per-area map after the node at `removed` has been deleted.
pub fn rekey_after_removal<T>(map: AreaMap<T>, removed: &AreaPath) -> AreaMap<T> {
    map.into_iter()
        .filter_map(|(key, value)| {
            key.path()
                .shift_after_removal(removed)
                .map(|path| (path.key(), value))
        })
        .collect()
}

/// A leaf of the area tree, which is where measurements are evaluated.
#[derive(Debug, Clone)]
pub struct LeafArea<'a> {
    pub path: AreaPath,
    pub name: String,
    pub area: &'a Area,
}

/// Depth-first walk to the leaves. Sub-sub areas are always leaves.
pub fn leaf_areas(areas: &[Area]) -> Vec<LeafArea<'_>> {
    let mut leaves = Vec::new();
    for (main_index, main) in areas.iter().enumerate() {
        let main_path = AreaPath::main(main_index);
        if main.sub_areas.is_empty() {
            leaves.push(LeafArea {
                path: main_path,
                name: main.name.clone(),
                area: main,
            });
            continue;
        }

        for (sub_index, sub) in main.sub_areas.iter().enumerate() {
            let sub_path = AreaPath::sub(main_index, sub_index);
            if sub.sub_areas.is_empty() {
                leaves.push(LeafArea {
                    path: sub_path,
                    name: format!("{} > {}", main.name, sub.name),
                    area: sub,
                });
                continue;
            }

            for (ss_index, ss) in sub.sub_areas.iter().enumerate() {
                leaves.push(LeafArea {
                    path: AreaPath::sub_sub(main_index, sub_index, ss_index),
                    name: format!("{} > {} > {}", main.name, sub.name, ss.name),
                    area: ss,
                });
            }
        }
    }
    leaves
}

/// Every addressable node, parents before children.
pub fn all_paths(areas: &[Area]) -> Vec<AreaPath> {
    let mut paths = Vec::new();
    for (main_index, main) in areas.iter().enumerate() {
        paths.push(AreaPath::main(main_index));
        for (sub_index, sub) in main.sub_areas.iter().enumerate() {
            paths.push(AreaPath::sub(main_index, sub_index));
            for ss_index in 0..sub.sub_areas.len() {
                paths.push(AreaPath::sub_sub(main_index, sub_index, ss_index));
            }
        }
    }
    paths
}

impl SurveyData {
    /// Delete the area at `path` and shift every area-keyed map to match.
    pub fn remove_area(mut self, path: &AreaPath) -> Result<Self, AreaError> {
        if path.resolve(&self.areas).is_none() {
            return Err(AreaError::NotFound(path.key()));
        }

        let siblings = match (path.sub, path.ss) {
            (None, _) => Some(&mut self.areas),
            (Some(_), None) => self
                .areas
                .get_mut(path.main)
                .map(|main| &mut main.sub_areas),
            (Some(sub), Some(_)) => self
                .areas
                .get_mut(path.main)
                .and_then(|main| main.sub_areas.get_mut(sub))
                .map(|sub| &mut sub.sub_areas),
        };
        let index = path.index_at(path.level());
        match (siblings, index) {
            (Some(siblings), Some(index)) if index < siblings.len() => {
                siblings.remove(index);
            }
            _ => return Err(AreaError::NotFound(path.key())),
        }

        self.noise_sources_by_area = rekey_after_removal(self.noise_sources_by_area, path);
        self.measurements_by_area = rekey_after_removal(self.measurements_by_area, path);
        self.controls_by_area = rekey_after_removal(self.controls_by_area, path);
        self.hearing_protection_devices =
            rekey_after_removal(self.hearing_protection_devices, path);
        self.hearing_issued_status = rekey_after_removal(self.hearing_issued_status, path);
        self.exposures_by_area = rekey_after_removal(self.exposures_by_area, path);
        self.comments_by_area = rekey_after_removal(self.comments_by_area, path);
        self.employees_by_area = rekey_after_removal(self.employees_by_area, path);

        tracing::debug!(area = %path.key(), "area removed and maps re-keyed");
        Ok(self)
    }

    /// Keys in any per-area map that no longer address a node of the tree.
    pub fn orphaned_keys(&self) -> Vec<AreaKey> {
        let mut keys: BTreeSet<AreaKey> = BTreeSet::new();
        keys.extend(self.noise_sources_by_area.keys().copied());
        keys.extend(self.measurements_by_area.keys().copied());
        keys.extend(self.controls_by_area.keys().copied());
        keys.extend(self.hearing_protection_devices.keys().copied());
        keys.extend(self.hearing_issued_status.keys().copied());
        keys.extend(self.exposures_by_area.keys().copied());
        keys.extend(self.comments_by_area.keys().copied());
        keys.extend(self.employees_by_area.keys().copied());

        keys.into_iter()
            .filter(|key| key.path().resolve(&self.areas).is_none())
            .collect()
    }
}
