// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floor slab perforation
//!
//! Builds the slab under a room and subtracts every penetration from the
//! floor below whose footprint reaches into it.

use crate::bounds::Aabb;
use crate::csg::CsgProcessor;
use crate::mesh::Mesh;
use crate::penetration::Penetration;
use crate::shapes::box_mesh;
use nalgebra::Point3;

/// Outcome of cutting one slab
#[derive(Debug, Clone)]
pub struct CutResult {
    pub mesh: Mesh,
    pub holes_cut: usize,
    pub holes_skipped: usize,
}

#[derive(Debug, Clone)]
pub struct FloorCutter {
    /// Holes narrower than this on either plan axis are ignored
    pub min_hole_size: f64,
    csg: CsgProcessor,
}

impl Default for FloorCutter {
    fn default() -> Self {
        Self {
            min_hole_size: 0.1,
            csg: CsgProcessor::new(),
        }
    }
}

impl FloorCutter {
    pub fn new(min_hole_size: f64) -> Self {
        Self {
            min_hole_size,
            ..Self::default()
        }
    }

    /// Slab occupying `room_box`, minus the penetrations that overlap it
    pub fn cut(&self, room_box: &Aabb, penetrations: &[Penetration]) -> CutResult {
        let hits: Vec<&Penetration> = penetrations
            .iter()
            .filter(|p| p.bounds.intersects_footprint(room_box))
            .collect();

        let slab = box_mesh(room_box);
        if hits.is_empty() {
            return CutResult {
                mesh: slab,
                holes_cut: 0,
                holes_skipped: 0,
            };
        }

        let thickness = room_box.size().y;
        let mid_y = room_box.center().y;
        let half_height = thickness.max(f64::EPSILON);

        let mut mesh = slab;
        let mut holes_cut = 0;
        let mut holes_skipped = 0;

        for penetration in hits {
            let clipped_min_x = penetration.bounds.min.x.max(room_box.min.x);
            let clipped_max_x = penetration.bounds.max.x.min(room_box.max.x);
            let clipped_min_z = penetration.bounds.min.z.max(room_box.min.z);
            let clipped_max_z = penetration.bounds.max.z.min(room_box.max.z);

            if clipped_max_x - clipped_min_x < self.min_hole_size
                || clipped_max_z - clipped_min_z < self.min_hole_size
            {
                tracing::debug!(
                    source = penetration.source.id(),
                    "penetration overlap too small, not cutting"
                );
                holes_skipped += 1;
                continue;
            }

            // Nothing of the slab survives; the kernel would return it whole
            if penetration.bounds.min.x <= room_box.min.x
                && penetration.bounds.max.x >= room_box.max.x
                && penetration.bounds.min.z <= room_box.min.z
                && penetration.bounds.max.z >= room_box.max.z
            {
                tracing::debug!(
                    source = penetration.source.id(),
                    "penetration covers the whole room, slab removed"
                );
                return CutResult {
                    mesh: Mesh::new(),
                    holes_cut: holes_cut + 1,
                    holes_skipped,
                };
            }

            // Sides clipped by the room are pushed past the slab edge so the
            // cutter never shares a face with it
            let pad = half_height;
            let hole_min_x = if penetration.bounds.min.x < room_box.min.x {
                room_box.min.x - pad
            } else {
                clipped_min_x
            };
            let hole_max_x = if penetration.bounds.max.x > room_box.max.x {
                room_box.max.x + pad
            } else {
                clipped_max_x
            };
            let hole_min_z = if penetration.bounds.min.z < room_box.min.z {
                room_box.min.z - pad
            } else {
                clipped_min_z
            };
            let hole_max_z = if penetration.bounds.max.z > room_box.max.z {
                room_box.max.z + pad
            } else {
                clipped_max_z
            };

            // Twice the slab thickness, centered on it
            let hole = box_mesh(&Aabb::new(
                Point3::new(hole_min_x, mid_y - half_height, hole_min_z),
                Point3::new(hole_max_x, mid_y + half_height, hole_max_z),
            ));

            match self.csg.subtract_mesh(&mesh, &hole) {
                Ok(cut) => {
                    mesh = cut;
                    holes_cut += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        source = penetration.source.id(),
                        error = %e,
                        "slab subtraction failed, skipping hole"
                    );
                    holes_skipped += 1;
                }
            }
        }

        CutResult {
            mesh,
            holes_cut,
            holes_skipped,
        }
    }
}
