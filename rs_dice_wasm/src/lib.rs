// rs_dice_wasm/src/lib.rs
// Browser-facing wrapper around a dice session.

use js_sys::{Float64Array, Math};
use rand::rngs::StdRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;
use rs_dice::geometry::DieMesh;
use rs_dice::session::{DiceSession, DieHandle};
use rs_dice::utils::{DiceError, SessionConfig};

fn to_js(err: DiceError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
pub struct WasmDiceSession {
    session: DiceSession,
    rng: StdRng,
}

#[wasm_bindgen]
impl WasmDiceSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WasmDiceSession, JsValue> {
        DiceSession::new(SessionConfig::default())
            .map(|session| Self {
                session,
                rng: StdRng::seed_from_u64((Math::random() * u64::MAX as f64) as u64),
            })
            .map_err(to_js)
    }

    /// Flat position (x, y, z per vertex) and uv (u, v per vertex) buffers of a
    /// triangle list.
    #[wasm_bindgen]
    pub fn set_die_mesh(&mut self, positions: &[f64], uvs: &[f64]) -> Result<(), JsValue> {
        let mesh = DieMesh::from_flat(positions, uvs).map_err(to_js)?;
        web_sys::console::log_1(&format!("die mesh: {} triangles", mesh.triangle_count()).into());
        self.session.set_die_mesh(mesh);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn use_standard_d6(&mut self, size: f64) {
        self.session.set_die_mesh(DieMesh::standard_d6(size));
    }

    #[wasm_bindgen]
    pub fn request_roll(&mut self, x: f64, y: f64, z: f64) -> Result<u64, JsValue> {
        self.session
            .request_roll((x, y, z))
            .map(|die| die.0)
            .map_err(to_js)
    }

    #[wasm_bindgen]
    pub fn request_random_throw(&mut self) -> Result<u64, JsValue> {
        self.session
            .request_random_throw(&mut self.rng)
            .map(|die| die.0)
            .map_err(to_js)
    }

    /// Advances to the given clock reading in seconds.
    #[wasm_bindgen]
    pub fn step(&mut self, elapsed_seconds: f64) -> usize {
        self.session.step(elapsed_seconds)
    }

    /// `[px, py, pz, qx, qy, qz, qw]`
    #[wasm_bindgen]
    pub fn pose(&self, die: u64) -> Result<Float64Array, JsValue> {
        let pose = self.session.pose_of(DieHandle(die)).map_err(to_js)?;
        let (x, y, z) = pose.position;
        let q = pose.orientation;
        Ok(Float64Array::from(&[x, y, z, q.x, q.y, q.z, q.w][..]))
    }

    /// The face value, or `undefined` while the die is still rolling.
    #[wasm_bindgen]
    pub fn result(&mut self, die: u64) -> Result<Option<u8>, JsValue> {
        match self.session.result_of(DieHandle(die)) {
            Ok(value) => Ok(Some(value)),
            Err(DiceError::NotSettled(_)) => Ok(None),
            Err(err) => Err(to_js(err)),
        }
    }

    #[wasm_bindgen]
    pub fn all_settled(&self) -> bool {
        self.session.all_settled()
    }

    #[wasm_bindgen]
    pub fn remove_die(&mut self, die: u64) -> Result<(), JsValue> {
        self.session.remove_die(DieHandle(die)).map_err(to_js)
    }

    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.session.reset();
    }
}
