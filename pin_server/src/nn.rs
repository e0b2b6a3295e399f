//! Monocular depth estimation with MiDaS ONNX models.
//!
use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use image::RgbImage;
use ndarray::s;
use smallvec::SmallVec;
use tract_onnx::prelude::*;

use crate::heightfield::DepthBuffer;
use crate::utils::download_file;

type NnModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;
type NnOut = SmallVec<[Arc<Tensor>; 4]>;

const MIDAS_RELEASE_URL: &str = "https://github.com/isl-org/MiDaS/releases/download/v2_1";

/// Depth inference backends implement this.
pub trait InferDepth {
    fn run(&self, input: &RgbImage) -> Result<DepthBuffer>;
}

/// Released MiDaS v2.1 ONNX variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidasVariant {
    /// `model-small.onnx`, 256x256 input, fast enough for webcams on CPU.
    Small256,
    /// `model-f6b98070.onnx`, 384x384 input.
    Large384,
}

impl MidasVariant {
    fn input_side(&self) -> usize {
        match self {
            MidasVariant::Small256 => 256,
            MidasVariant::Large384 => 384,
        }
    }

    fn file_name(&self) -> &'static str {
        match self {
            MidasVariant::Small256 => "model-small.onnx",
            MidasVariant::Large384 => "model-f6b98070.onnx",
        }
    }
}

impl std::str::FromStr for MidasVariant {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "small" => Ok(MidasVariant::Small256),
            "large" => Ok(MidasVariant::Large384),
            other => bail!("unknown model variant '{other}', expected 'small' or 'large'"),
        }
    }
}

pub struct MidasModel {
    model: NnModel,
    side: usize,
}

impl MidasModel {
    /// Load a MiDaS variant, downloading the model file on first use.
    pub async fn new(variant: MidasVariant) -> Result<Self> {
        let model = get_midas_model(variant).await?;

        Ok(Self {
            model,
            side: variant.input_side(),
        })
    }

    fn preproc(&self, input: &RgbImage) -> Tensor {
        let side = self.side;
        let resized: RgbImage = image::imageops::resize(
            input,
            side as u32,
            side as u32,
            image::imageops::FilterType::Triangle,
        );

        let tensor: Tensor =
            tract_ndarray::Array4::from_shape_fn((1, 3, side, side), |(_, c, y, x)| {
                // ImageNet mean/std, as the MiDaS transforms use.
                let mean = [0.485, 0.456, 0.406][c];
                let std = [0.229, 0.224, 0.225][c];
                (resized[(x as _, y as _)][c] as f32 / 255.0 - mean) / std
            })
            .into();

        tensor
    }

    fn postproc(&self, raw_nn_out: NnOut) -> Result<DepthBuffer> {
        // Relative inverse depth, shape [1, side, side]; larger = nearer.
        let depth: Vec<f32> = raw_nn_out[0]
            .to_array_view::<f32>()?
            .slice(s![0, .., ..])
            .iter()
            .cloned()
            .collect();

        DepthBuffer::new(depth, self.side, self.side)
    }
}

impl InferDepth for MidasModel {
    fn run(&self, input: &RgbImage) -> Result<DepthBuffer> {
        let valid_input = tvec!(self.preproc(input));
        let raw_nn_out = self.model.run(valid_input)?;

        self.postproc(raw_nn_out)
    }
}

async fn get_midas_model(variant: MidasVariant) -> Result<NnModel> {
    let model_path = model_file_path(variant)?;
    if !model_path.exists() {
        let url = format!("{}/{}", MIDAS_RELEASE_URL, variant.file_name());
        log::info!("Downloading {} to {:?}", variant.file_name(), &model_path);
        download_file(&reqwest::Client::new(), &url, &model_path).await?;
    }

    let side = variant.input_side();
    let input_fact = InferenceFact::dt_shape(f32::datum_type(), tvec!(1, 3, side, side));
    let model = tract_onnx::onnx()
        .model_for_path(&model_path)?
        .with_input_fact(0, input_fact)?
        .into_optimized()?
        .into_runnable()?;

    Ok(model)
}

fn model_file_path(variant: MidasVariant) -> Result<PathBuf> {
    let mut dir = dirs::cache_dir().ok_or_else(|| anyhow!("no cache directory available"))?;
    dir.push("pinscreen");
    std::fs::create_dir_all(&dir)?;

    Ok(dir.join(variant.file_name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_names_parse() {
        assert_eq!("small".parse::<MidasVariant>().unwrap(), MidasVariant::Small256);
        assert_eq!("large".parse::<MidasVariant>().unwrap(), MidasVariant::Large384);
        assert!("tiny".parse::<MidasVariant>().is_err());
    }
}
