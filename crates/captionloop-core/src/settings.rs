use captionloop_agent::{create_generator, CaptionBrief, Generator, GeneratorType, ProviderConfig};
use captionloop_critic::{create_evaluator, Evaluator, EvaluatorType};
use tracing::debug;

use crate::LoopError;

pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// Everything needed to assemble a run
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub brief: CaptionBrief,
    pub max_attempts: usize,
    pub max_words: usize,
    pub generator: GeneratorType,
    pub evaluator: EvaluatorType,
    pub generator_provider: ProviderConfig,
    pub evaluator_provider: ProviderConfig,
}

/// The generator/evaluator pair a run drives
pub struct Capabilities {
    pub generator: Box<dyn Generator>,
    pub evaluator: Box<dyn Evaluator>,
}

impl RunSettings {
    /// Build both capabilities. Provider/model mismatches fail here, before
    /// any loop iteration, whichever variants are selected.
    pub fn build_capabilities(&self) -> Result<Capabilities, LoopError> {
        debug!(
            generator = %self.generator,
            evaluator = %self.evaluator,
            "Building capabilities"
        );

        self.generator_provider.validate()?;
        self.evaluator_provider.validate()?;

        let generator = create_generator(
            self.generator,
            self.brief.clone(),
            self.max_words,
            &self.generator_provider,
        )?;
        let evaluator = create_evaluator(
            self.evaluator,
            &self.brief.product,
            self.max_words,
            &self.evaluator_provider,
        )?;

        Ok(Capabilities {
            generator,
            evaluator,
        })
    }
}
