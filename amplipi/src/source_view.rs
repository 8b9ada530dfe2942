use crate::fitter::fittest_representation;
use crate::models::{Group, GroupId, SourceId, Status, Zone, ZoneId};
use crate::volume::{aggregate_group_volume, aggregate_mute, aggregate_volume};

/// Something a slider or mute button acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlTarget {
    Source(SourceId),
    Group(GroupId),
    Zone(ZoneId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupControl {
    pub group: Group,
    pub zones: Vec<Zone>,
    pub vol_f: f64,
    pub mute: bool,
}

/// What to render for one source: its master slider, a slider per fitted
/// group and a slider per zone no group covers.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceView {
    pub source_id: SourceId,
    pub name: String,
    pub zones: Vec<Zone>,
    pub vol_f: f64,
    pub mute: bool,
    pub groups: Vec<GroupControl>,
    pub standalone: Vec<Zone>,
}

impl SourceView {
    pub fn build(status: &Status, source_id: SourceId) -> Self {
        let zones = status.zones_for_source(source_id);
        let candidates: Vec<Group> = status
            .groups
            .iter()
            .filter(|group| !group.is_empty())
            .cloned()
            .collect();

        let representation = fittest_representation(&zones, &candidates);

        let groups = representation
            .groups
            .into_iter()
            .map(|group| {
                let members: Vec<Zone> = zones
                    .iter()
                    .filter(|zone| group.contains(zone.id))
                    .cloned()
                    .collect();
                GroupControl {
                    vol_f: aggregate_group_volume(&members),
                    mute: aggregate_mute(&members),
                    zones: members,
                    group,
                }
            })
            .collect();

        let name = status
            .source(source_id)
            .map(|source| source.name.clone())
            .unwrap_or_else(|| format!("Source {}", source_id.0 + 1));

        Self {
            source_id,
            name,
            vol_f: aggregate_volume(&zones),
            mute: aggregate_mute(&zones),
            zones,
            groups,
            standalone: representation.zones,
        }
    }

    pub fn zone_ids(&self) -> Vec<ZoneId> {
        self.zones.iter().map(|zone| zone.id).collect()
    }

    /// Source first, then groups, then standalone zones.
    pub fn targets(&self) -> Vec<ControlTarget> {
        let mut targets = vec![ControlTarget::Source(self.source_id)];
        targets.extend(self.groups.iter().map(|g| ControlTarget::Group(g.group.id)));
        targets.extend(self.standalone.iter().map(|z| ControlTarget::Zone(z.id)));
        targets
    }

    /// Displayed volume and mute of a target, if it belongs to this view.
    pub fn level(&self, target: ControlTarget) -> Option<(f64, bool)> {
        match target {
            ControlTarget::Source(id) if id == self.source_id => Some((self.vol_f, self.mute)),
            ControlTarget::Source(_) => None,
            ControlTarget::Group(id) => self
                .groups
                .iter()
                .find(|control| control.group.id == id)
                .map(|control| (control.vol_f, control.mute)),
            ControlTarget::Zone(id) => self
                .standalone
                .iter()
                .find(|zone| zone.id == id)
                .map(|zone| (zone.vol_f, zone.mute)),
        }
    }
}
