use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HfImageRequest {
    pub inputs: String,
}

#[derive(Debug, Serialize)]
pub struct HfVideoRequest {
    pub inputs: String,
    pub parameters: HfVideoParameters,
    pub options: HfOptions,
}

#[derive(Debug, Serialize)]
pub struct HfVideoParameters {
    pub negative_prompt: String,
    pub num_frames: u32,
    pub num_inference_steps: u32,
    pub guidance_scale: f32,
}

#[derive(Debug, Serialize)]
pub struct HfOptions {
    pub wait_for_model: bool,
    pub use_cache: bool,
}
