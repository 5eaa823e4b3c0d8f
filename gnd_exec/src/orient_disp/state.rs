//! Implementations for the OrientDisp state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use comms_if::tm::ImuData;
use log::{debug, trace, warn};
use nalgebra::Point3;
use serde::Serialize;
use std::sync::Arc;

// Internal
use super::{
    DegradedCause, Mesh, MeshCache, MeshInstance, OrientDispError, Orientation, Params, Scene,
};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    host,
    module::State,
    params,
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Orientation display module state
#[derive(Default)]
pub struct OrientDisp {
    pub(crate) params: Params,

    mesh_cache: MeshCache,
    mesh: Option<Arc<Mesh>>,

    num_frames: u64,

    pub(crate) report: StatusReport,
    last_euler_xyz_rad: Option<[f64; 3]>,
    arch_report: Archiver,
}

/// Input data to the orientation display.
#[derive(Default)]
pub struct InputData {
    /// Latest IMU data, or `None` if none has been received yet.
    pub imu: Option<ImuData>,
}

/// Status report for OrientDisp processing.
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq)]
pub struct StatusReport {
    /// True if an orientation was available this frame
    pub orientation_present: bool,

    /// Norm of the received quaternion, zero if none was received
    pub quat_norm: f64,

    /// Set if the orientation could not be displayed faithfully
    pub degraded: Option<DegradedCause>,
}

/// Flat archive record, one per frame.
#[derive(Serialize)]
struct ArchRecord {
    time_s: f64,
    frame: u64,
    orientation_present: bool,
    quat_norm: f64,
    degraded: Option<DegradedCause>,
    euler_x_rad: Option<f64>,
    euler_y_rad: Option<f64>,
    euler_z_rad: Option<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for OrientDisp {
    const NAME: &'static str = "OrientDisp";

    type InitData = &'static str;
    type InitError = OrientDispError;

    type InputData = InputData;
    type OutputData = Scene;
    type StatusReport = StatusReport;
    type ProcError = OrientDispError;

    /// Initialise the OrientDisp module.
    ///
    /// Expected init data is the path to the parameter file. The mesh named in the parameters is
    /// loaded here, so a missing asset fails initialisation.
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        let params: Params = params::load(init_data).map_err(OrientDispError::ParamLoadError)?;

        let mesh_path = match params.mesh_path.is_absolute() {
            true => params.mesh_path.clone(),
            false => host::get_sw_root()
                .map_err(OrientDispError::AssetRootError)?
                .join(&params.mesh_path),
        };

        *self = Self::new(params)?;
        self.load_mesh(mesh_path)?;

        self.arch_report = Archiver::from_path(session, "orient_disp/status_report.csv")
            .map_err(OrientDispError::ArchiveError)?;

        Ok(())
    }

    /// Build the scene for this frame.
    ///
    /// The rotation is recomputed from the input on every call.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let mesh = match self.mesh {
            Some(ref m) => m.clone(),
            None => return Err(OrientDispError::NoMesh),
        };

        self.num_frames += 1;
        self.report = StatusReport::default();
        self.last_euler_xyz_rad = None;

        let quat = input_data.imu.as_ref().and_then(|imu| imu.orientation);

        let instance = match quat {
            None => None,
            Some(q) => {
                let orientation = Orientation::validate(&q, self.params.unit_norm_tolerance);

                self.report.orientation_present = true;
                self.report.quat_norm = q.norm();
                self.report.degraded = orientation.degraded_cause();

                if let Some(cause) = self.report.degraded {
                    warn!("Orientation degraded ({:?}): {:?}", cause, q);
                }

                orientation.attitude().map(|attitude| {
                    MeshInstance::new(
                        mesh,
                        Point3::from(self.params.mesh_position),
                        &attitude,
                        self.params.mesh_colour,
                    )
                })
            }
        };

        if let Some(ref i) = instance {
            self.last_euler_xyz_rad = Some(i.euler_xyz_rad);
            trace!("OrientDisp mesh euler XYZ: {:?} rad", i.euler_xyz_rad);
        }

        let scene = Scene {
            style: self.params.style,
            lights: self.params.lights.clone(),
            mesh: instance,
            degraded: self.report.degraded,
        };

        Ok((scene, self.report))
    }
}

impl Archived for OrientDisp {
    fn write(&mut self) -> Result<(), ArchiveError> {
        let euler = self.last_euler_xyz_rad;

        self.arch_report.serialise(ArchRecord {
            time_s: session::get_elapsed_seconds(),
            frame: self.num_frames,
            orientation_present: self.report.orientation_present,
            quat_norm: self.report.quat_norm,
            degraded: self.report.degraded,
            euler_x_rad: euler.map(|e| e[0]),
            euler_y_rad: euler.map(|e| e[1]),
            euler_z_rad: euler.map(|e| e[2]),
        })
    }
}

impl OrientDisp {
    /// Create a new display from parameters. A mesh must be provided, with `load_mesh` or
    /// `set_mesh`, before processing.
    pub fn new(params: Params) -> Result<Self, OrientDispError> {
        params
            .style
            .validate()
            .map_err(OrientDispError::InvalidStyle)?;

        Ok(Self {
            params,
            ..Default::default()
        })
    }

    /// Load the display mesh from an STL file, through the mesh cache.
    pub fn load_mesh<P: AsRef<std::path::Path>>(&mut self, path: P) -> Result<(), OrientDispError> {
        let mesh = self
            .mesh_cache
            .get_or_load(path)
            .map_err(OrientDispError::MeshLoadError)?;

        debug!(
            "OrientDisp mesh set ({} triangles, bounds {:?})",
            mesh.num_triangles(),
            mesh.bounds()
        );

        self.mesh = Some(mesh);
        Ok(())
    }

    /// Use an already loaded mesh.
    pub fn set_mesh(&mut self, mesh: Arc<Mesh>) {
        self.mesh = Some(mesh);
    }

    pub fn num_frames(&self) -> u64 {
        self.num_frames
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::orient_disp::{Light, StlError, Triangle};
    use comms_if::tm::Quaternion;
    use nalgebra::{UnitQuaternion, Vector3};

    fn test_mesh() -> Arc<Mesh> {
        Arc::new(Mesh {
            triangles: vec![Triangle {
                normal: Vector3::z(),
                vertices: [
                    nalgebra::Point3::new(0.0, 0.0, 0.0),
                    nalgebra::Point3::new(1.0, 0.0, 0.0),
                    nalgebra::Point3::new(0.0, 1.0, 0.0),
                ],
            }],
        })
    }

    fn disp() -> OrientDisp {
        let mut d = OrientDisp::new(Params::default()).unwrap();
        d.set_mesh(test_mesh());
        d
    }

    fn input(q: Option<Quaternion>) -> InputData {
        InputData {
            imu: Some(ImuData { orientation: q }),
        }
    }

    #[test]
    fn test_no_orientation_renders_lights_only() {
        let mut d = disp();

        let (scene, rpt) = d.proc(&InputData::default()).unwrap();
        assert!(scene.is_empty());
        assert_eq!(scene.lights, Light::default_set());
        assert!(!rpt.orientation_present);

        let (scene, _) = d.proc(&input(None)).unwrap();
        assert!(scene.is_empty());
        assert_eq!(scene.degraded, None);
    }

    #[test]
    fn test_rotation_round_trip() {
        let mut d = disp();

        let attitudes = [
            UnitQuaternion::identity(),
            UnitQuaternion::from_euler_angles(0.3, -0.7, 2.1),
            UnitQuaternion::from_euler_angles(-2.9, 1.2, -0.1),
            UnitQuaternion::from_axis_angle(&Vector3::y_axis(), std::f64::consts::FRAC_PI_2),
        ];

        for att in attitudes.iter() {
            let q = att.quaternion();
            let (scene, rpt) = d
                .proc(&input(Some(Quaternion::new(q.i, q.j, q.k, q.w))))
                .unwrap();

            assert_eq!(rpt.degraded, None);

            let back = scene.mesh.unwrap().attitude();

            // q and -q are the same rotation
            assert!(
                back.quaternion().dot(att.quaternion()).abs() > 1.0 - 1e-9,
                "{:?} came back as {:?}",
                att,
                back
            );
        }
    }

    #[test]
    fn test_each_frame_snaps_to_latest() {
        let mut d = disp();
        let a = UnitQuaternion::from_euler_angles(0.0, 0.0, 1.0);
        let b = UnitQuaternion::from_euler_angles(0.0, 0.0, -1.0);

        for att in [a, b, a].iter() {
            let q = att.quaternion();
            let (scene, _) = d
                .proc(&input(Some(Quaternion::new(q.i, q.j, q.k, q.w))))
                .unwrap();
            let back = scene.mesh.unwrap().attitude();
            assert!((back.to_rotation_matrix().matrix() - att.to_rotation_matrix().matrix()).norm() < 1e-9);
        }

        assert_eq!(d.num_frames(), 3);
    }

    #[test]
    fn test_degraded_orientations() {
        let mut d = disp();

        let (scene, rpt) = d
            .proc(&input(Some(Quaternion::new(0.0, 0.0, 0.0, 1.5))))
            .unwrap();
        assert!(!scene.is_empty());
        assert_eq!(rpt.degraded, Some(DegradedCause::NonUnitQuaternion));
        assert_eq!(rpt.quat_norm, 1.5);

        let (scene, rpt) = d
            .proc(&input(Some(Quaternion::new(f64::INFINITY, 0.0, 0.0, 1.0))))
            .unwrap();
        assert!(scene.is_empty());
        assert!(rpt.orientation_present);
        assert_eq!(scene.degraded, Some(DegradedCause::NonFiniteQuaternion));
    }

    #[test]
    fn test_proc_without_mesh() {
        let mut d = OrientDisp::new(Params::default()).unwrap();
        assert!(matches!(
            d.proc(&InputData::default()),
            Err(OrientDispError::NoMesh)
        ));
    }

    #[test]
    fn test_missing_mesh_asset() {
        let mut d = OrientDisp::new(Params::default()).unwrap();

        assert!(matches!(
            d.load_mesh("no/such/mesh.stl"),
            Err(OrientDispError::MeshLoadError(StlError::ReadError(_, _)))
        ));

        // Nothing to draw, so processing refuses rather than showing an empty scene
        assert!(matches!(
            d.proc(&InputData::default()),
            Err(OrientDispError::NoMesh)
        ));
    }

    #[test]
    fn test_load_mesh_asset() {
        // Tests run from the crate directory
        let mut d = OrientDisp::new(Params::default()).unwrap();
        d.load_mesh("../assets/imu_mount.stl").unwrap();

        let (scene, _) = d
            .proc(&input(Some(Quaternion::new(0.0, 0.0, 0.0, 1.0))))
            .unwrap();
        assert!(!scene.is_empty());
    }
}
