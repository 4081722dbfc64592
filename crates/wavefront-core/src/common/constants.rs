//! Physical constants and reference output names.

/// Electron rest energy [GeV].
pub const ELECTRON_REST_ENERGY_GEV: f64 = 0.51099890221e-03;

/// `e / (2 pi m_e c)` [1/(T m)], so that `K = FACTOR * B * period`.
pub const DEFLECTION_PARAMETER_FACTOR: f64 = 93.372_904_8;

/// Photon energy [eV] times wavelength [m].
pub const PHOTON_ENERGY_WAVELENGTH_PRODUCT: f64 = 1.239_841_984e-06;

pub const DEFAULT_OUTPUT_DIR: &str = "data_example_08";
pub const TRAJECTORY_FILE: &str = "wfr_res_traj.dat";
pub const SPECTRUM_INTENSITY_FILE: &str = "wfr_res_crl_int1.dat";
pub const INITIAL_INTENSITY_FILE: &str = "wfr_res_crl_int2.dat";
pub const PROPAGATED_INTENSITY_FILE: &str = "wfr_res_crl_int3.dat";
pub const PARTIALLY_COHERENT_FILE: &str = "wfr_res_crl_int_part_coh1.dat";
pub const CRL_TRANSMISSION_FILE: &str = "res_op_transm_CRL.dat";
pub const CRL_PATH_DIFFERENCE_FILE: &str = "res_op_path_dif_CRL.dat";
