//!
//! The Link Table.
//!
//! A link connects a variable of this component to a variable of some
//! (possibly the same) component.  When the source end of a link accepts
//! a message a copy of it is sent to the target end.  Log links work the
//! same way but are grouped by log port so they can be queried per port.
//!

use std::collections::{BTreeMap, HashMap};

use nrs_core::Vnid;

/// The far end of a link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    /// The component hosting the far end
    pub cid: String,
    /// The VNID of the far end inside that component
    pub vnid: Vnid,
    /// Whether the link should not outlive the session that created it
    pub temporary: bool,
}

/// Which end of a link the local variable is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkEnd {
    /// The local variable sends copies to the far end
    Source,
    /// The local variable receives copies from the far end
    Target,
}

impl LinkEnd {
    /// Interpret the PML `sourceNotTarget` flag
    pub fn from_source_not_target(source_not_target: bool) -> Self {
        if source_not_target {
            Self::Source
        } else {
            Self::Target
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct LogLink {
    source: Vnid,
    link: Link,
}

/// Every link of a component.
#[derive(Clone, Debug, Default)]
pub struct LinkTable {
    outgoing: HashMap<Vnid, Vec<Link>>,
    incoming: HashMap<Vnid, Vec<Link>>,
    logs: BTreeMap<u32, Vec<LogLink>>,
}

impl LinkTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    fn side(&self, end: LinkEnd) -> &HashMap<Vnid, Vec<Link>> {
        match end {
            LinkEnd::Source => &self.outgoing,
            LinkEnd::Target => &self.incoming,
        }
    }

    fn side_mut(&mut self, end: LinkEnd) -> &mut HashMap<Vnid, Vec<Link>> {
        match end {
            LinkEnd::Source => &mut self.outgoing,
            LinkEnd::Target => &mut self.incoming,
        }
    }

    /// Add a link to a local variable.  Returns false if the same far end
    /// is already linked.
    pub fn add(&mut self, vnid: Vnid, end: LinkEnd, link: Link) -> bool {
        let links = self.side_mut(end).entry(vnid).or_default();
        if links
            .iter()
            .any(|existing| existing.cid == link.cid && existing.vnid == link.vnid)
        {
            return false;
        }
        links.push(link);
        true
    }

    /// Remove a link from a local variable.  Returns whether it existed.
    pub fn remove(&mut self, vnid: Vnid, end: LinkEnd, cid: &str, far_vnid: Vnid) -> bool {
        let Some(links) = self.side_mut(end).get_mut(&vnid) else {
            return false;
        };
        let before = links.len();
        links.retain(|link| !(link.cid == cid && link.vnid == far_vnid));
        before != links.len()
    }

    /// The number of links at one end of a local variable
    pub fn count(&self, vnid: Vnid, end: LinkEnd) -> usize {
        self.side(end).get(&vnid).map_or(0, Vec::len)
    }

    /// The `index`th link at one end of a local variable
    pub fn link(&self, vnid: Vnid, end: LinkEnd, index: usize) -> Option<&Link> {
        self.side(end).get(&vnid).and_then(|links| links.get(index))
    }

    /// Add a log link from a local variable on a log port.  Returns false
    /// if it already exists.
    pub fn add_log(&mut self, log_port: u32, source: Vnid, link: Link) -> bool {
        let logs = self.logs.entry(log_port).or_default();
        let log = LogLink { source, link };
        if logs.contains(&log) {
            return false;
        }
        logs.push(log);
        true
    }

    /// Remove a log link.  Returns whether it existed.
    pub fn remove_log(&mut self, log_port: u32, source: Vnid, cid: &str, far_vnid: Vnid) -> bool {
        let Some(logs) = self.logs.get_mut(&log_port) else {
            return false;
        };
        let before = logs.len();
        logs.retain(|log| !(log.source == source && log.link.cid == cid && log.link.vnid == far_vnid));
        before != logs.len()
    }

    /// The `index`th log link on a log port
    pub fn log(&self, log_port: u32, index: usize) -> Option<&Link> {
        self.logs
            .get(&log_port)
            .and_then(|logs| logs.get(index))
            .map(|log| &log.link)
    }

    /// Every far end a message accepted by `vnid` should be copied to:
    /// its outgoing links followed by its log links in log port order
    pub fn targets(&self, vnid: Vnid) -> Vec<Link> {
        let mut targets: Vec<Link> = self.outgoing.get(&vnid).cloned().unwrap_or_default();
        for logs in self.logs.values() {
            targets.extend(
                logs.iter()
                    .filter(|log| log.source == vnid)
                    .map(|log| log.link.clone()),
            );
        }
        targets
    }

    /// Drop every link of local variables that no longer exist
    pub fn forget(&mut self, removed: &[Vnid]) {
        for vnid in removed {
            self.outgoing.remove(vnid);
            self.incoming.remove(vnid);
        }
        for logs in self.logs.values_mut() {
            logs.retain(|log| !removed.contains(&log.source));
        }
    }

    /// Drop every link
    pub fn clear(&mut self) {
        self.outgoing.clear();
        self.incoming.clear();
        self.logs.clear();
    }
}
