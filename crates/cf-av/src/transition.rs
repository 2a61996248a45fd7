//! Crossfade filter-graph planning.
//!
//! Given the ordered durations of N clips and a fade length, the
//! [`TransitionGraphBuilder`] produces a [`TransitionPlan`]: N-1 stages, each
//! crossfading the running merged stream with the next raw input, for video
//! (`xfade`) and audio (`acrossfade`) alike.
//!
//! Offsets live on the timeline of the progressively merged stream. Every
//! crossfade shortens that stream by the fade length, so stage `s` starts at
//! `sum(d[0..=s]) - (s + 1) * fade`. For `[10, 8, 12]` with a 1 s fade the
//! stages start at 9 s and 16 s:
//!
//! ```text
//! [0:v][1:v]xfade=transition=fade:duration=1:offset=9[v1];
//! [0:a][1:a]acrossfade=d=1[a1];
//! [v1][2:v]xfade=transition=fade:duration=1:offset=16[v2];
//! [a1][2:a]acrossfade=d=1[a2]
//! ```
//!
//! Building a plan is a pure function of its inputs: the same durations and
//! fade always yield the same graph.

use std::fmt;

use cf_core::TransitionKind;

/// Fewest clips a transition merge accepts.
pub const MIN_CLIPS: usize = 2;

/// The two media domains a stage crossfades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Video,
    Audio,
}

impl MediaKind {
    fn stream_specifier(self) -> char {
        match self {
            MediaKind::Video => 'v',
            MediaKind::Audio => 'a',
        }
    }
}

/// A pad label inside the filter graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamLabel {
    /// A stream of a raw input file, rendered as `0:v`, `2:a`, ...
    Input { index: usize, kind: MediaKind },
    /// The output of a crossfade stage, rendered as `v1`, `a3`, ...
    Merged { index: usize, kind: MediaKind },
}

impl StreamLabel {
    /// Label of the merged stream after `index` clips have been fused.
    ///
    /// Index 0 is reserved for the raw first input: nothing has been merged
    /// yet, so the "merged" stream is simply input 0. Index `k >= 1` names
    /// the output of the stage that fused clip `k` in.
    pub fn merged(index: usize, kind: MediaKind) -> Self {
        if index == 0 {
            StreamLabel::Input { index: 0, kind }
        } else {
            StreamLabel::Merged { index, kind }
        }
    }

    /// Label of a raw input stream.
    pub fn input(index: usize, kind: MediaKind) -> Self {
        StreamLabel::Input { index, kind }
    }

    pub fn kind(&self) -> MediaKind {
        match self {
            StreamLabel::Input { kind, .. } | StreamLabel::Merged { kind, .. } => *kind,
        }
    }
}

impl fmt::Display for StreamLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamLabel::Input { index, kind } => {
                write!(f, "{index}:{}", kind.stream_specifier())
            }
            StreamLabel::Merged { index, kind } => {
                write!(f, "{}{index}", kind.stream_specifier())
            }
        }
    }
}

/// One crossfade step of the chain.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphStage {
    /// Position of the stage in the chain, from 0.
    pub index: usize,
    /// Running merged video stream fed into this stage.
    pub video_in: StreamLabel,
    /// Running merged audio stream fed into this stage.
    pub audio_in: StreamLabel,
    /// Raw input fused in by this stage.
    pub incoming: usize,
    pub video_out: StreamLabel,
    pub audio_out: StreamLabel,
    /// Start of the video crossfade on the merged timeline, in seconds.
    pub offset_secs: f64,
    pub fade_secs: f64,
}

impl GraphStage {
    /// Render the stage's `xfade` filter.
    pub fn video_filter(&self, transition: TransitionKind) -> String {
        format!(
            "[{}][{}]xfade=transition={}:duration={}:offset={}[{}]",
            self.video_in,
            StreamLabel::input(self.incoming, MediaKind::Video),
            transition.xfade_name(),
            format_secs(self.fade_secs),
            format_secs(self.offset_secs),
            self.video_out,
        )
    }

    /// Render the stage's `acrossfade` filter. The audio primitive takes no
    /// offset: it always overlaps the tail of the first input with the head
    /// of the second.
    pub fn audio_filter(&self) -> String {
        format!(
            "[{}][{}]acrossfade=d={}[{}]",
            self.audio_in,
            StreamLabel::input(self.incoming, MediaKind::Audio),
            format_secs(self.fade_secs),
            self.audio_out,
        )
    }
}

/// Non-fatal problems detected while planning.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanWarning {
    /// The fade is not shorter than a clip, so its crossfade offset lands
    /// before the clip starts or overlaps an unrelated segment.
    FadeOverrun {
        clip_index: usize,
        duration_secs: f64,
        fade_secs: f64,
    },
}

impl fmt::Display for PlanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanWarning::FadeOverrun {
                clip_index,
                duration_secs,
                fade_secs,
            } => write!(
                f,
                "fade of {fade_secs}s is not shorter than clip {clip_index} ({duration_secs}s)"
            ),
        }
    }
}

/// A complete crossfade chain ready to hand to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionPlan {
    pub stages: Vec<GraphStage>,
    pub transition: TransitionKind,
    pub fade_secs: f64,
    /// Final merged video label, mapped to the output's video stream.
    pub output_video: StreamLabel,
    /// Final merged audio label, mapped to the output's audio stream.
    pub output_audio: StreamLabel,
    /// Length of the merged output: total clip time minus one fade per stage.
    pub total_duration_secs: f64,
    pub warnings: Vec<PlanWarning>,
}

impl TransitionPlan {
    /// Number of raw inputs the plan consumes.
    pub fn input_count(&self) -> usize {
        self.stages.len() + 1
    }

    /// `(video, audio)` labels of the final merged streams.
    pub fn output_labels(&self) -> (StreamLabel, StreamLabel) {
        (self.output_video, self.output_audio)
    }

    /// Render the full graph in ffmpeg `-filter_complex` syntax.
    pub fn filter_complex(&self) -> String {
        self.stages
            .iter()
            .flat_map(|stage| [stage.video_filter(self.transition), stage.audio_filter()])
            .collect::<Vec<_>>()
            .join(";")
    }

    /// `-map` arguments selecting the final labels for the muxed output.
    pub fn map_args(&self) -> [String; 4] {
        [
            "-map".to_string(),
            format!("[{}]", self.output_video),
            "-map".to_string(),
            format!("[{}]", self.output_audio),
        ]
    }
}

/// Builds [`TransitionPlan`]s for a fixed fade length and transition kind.
#[derive(Debug, Clone, Copy)]
pub struct TransitionGraphBuilder {
    fade_secs: f64,
    transition: TransitionKind,
}

impl TransitionGraphBuilder {
    pub fn new(fade_secs: f64) -> Self {
        Self {
            fade_secs,
            transition: TransitionKind::default(),
        }
    }

    /// Select the video transition (defaults to a plain fade).
    pub fn transition(mut self, transition: TransitionKind) -> Self {
        self.transition = transition;
        self
    }

    /// Plan the crossfade chain for clips of the given durations, in order.
    ///
    /// # Errors
    ///
    /// - [`cf_core::Error::InsufficientClips`] for fewer than two durations.
    /// - [`cf_core::Error::Validation`] if the fade is not a positive finite
    ///   number, or a duration is negative or non-finite.
    ///
    /// A fade that is not shorter than every clip is *not* rejected; the
    /// resulting offsets are kept as computed and the plan carries a
    /// [`PlanWarning::FadeOverrun`] per affected clip.
    pub fn build(&self, durations: &[f64]) -> cf_core::Result<TransitionPlan> {
        if durations.len() < MIN_CLIPS {
            return Err(cf_core::Error::InsufficientClips {
                count: durations.len(),
            });
        }

        let fade = self.fade_secs;
        if !fade.is_finite() || fade <= 0.0 {
            return Err(cf_core::Error::Validation(format!(
                "fade duration must be a positive number of seconds, got {fade}"
            )));
        }

        if let Some((i, d)) = durations
            .iter()
            .enumerate()
            .find(|(_, d)| !d.is_finite() || **d < 0.0)
        {
            return Err(cf_core::Error::Validation(format!(
                "clip {i} has invalid duration {d}"
            )));
        }

        let warnings: Vec<PlanWarning> = durations
            .iter()
            .enumerate()
            .filter(|(_, d)| **d <= fade)
            .map(|(clip_index, &duration_secs)| PlanWarning::FadeOverrun {
                clip_index,
                duration_secs,
                fade_secs: fade,
            })
            .collect();
        for warning in &warnings {
            tracing::warn!("{warning}");
        }

        let stages: Vec<GraphStage> = crossfade_offsets(durations, fade)
            .enumerate()
            .map(|(index, offset_secs)| GraphStage {
                index,
                video_in: StreamLabel::merged(index, MediaKind::Video),
                audio_in: StreamLabel::merged(index, MediaKind::Audio),
                incoming: index + 1,
                video_out: StreamLabel::merged(index + 1, MediaKind::Video),
                audio_out: StreamLabel::merged(index + 1, MediaKind::Audio),
                offset_secs,
                fade_secs: fade,
            })
            .collect();

        let last = durations.len() - 1;
        let total_duration_secs = durations.iter().sum::<f64>() - fade * stages.len() as f64;

        Ok(TransitionPlan {
            stages,
            transition: self.transition,
            fade_secs: fade,
            output_video: StreamLabel::merged(last, MediaKind::Video),
            output_audio: StreamLabel::merged(last, MediaKind::Audio),
            total_duration_secs,
            warnings,
        })
    }
}

/// Plan a plain-fade chain. Shorthand for `TransitionGraphBuilder::new(fade).build(durations)`.
pub fn build_plan(durations: &[f64], fade_secs: f64) -> cf_core::Result<TransitionPlan> {
    TransitionGraphBuilder::new(fade_secs).build(durations)
}

/// Offsets of each crossfade on the merged timeline, as a left fold over
/// every clip but the last: `offset_s = offset_{s-1} + d_s - fade`.
fn crossfade_offsets(durations: &[f64], fade: f64) -> impl Iterator<Item = f64> + '_ {
    durations[..durations.len() - 1]
        .iter()
        .scan(0.0, move |merged_end, &d| {
            *merged_end += d - fade;
            Some(*merged_end)
        })
}

/// Seconds rendered with millisecond precision and no trailing zeros.
fn format_secs(secs: f64) -> String {
    let s = format!("{secs:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn three_clips() {
        let plan = build_plan(&[10.0, 8.0, 12.0], 1.0).unwrap();
        assert_eq!(plan.stages.len(), 2);

        let s0 = &plan.stages[0];
        assert_eq!(s0.offset_secs, 9.0);
        assert_eq!(s0.video_in.to_string(), "0:v");
        assert_eq!(s0.audio_in.to_string(), "0:a");
        assert_eq!(s0.incoming, 1);
        assert_eq!(s0.video_out.to_string(), "v1");
        assert_eq!(s0.audio_out.to_string(), "a1");

        let s1 = &plan.stages[1];
        assert_eq!(s1.offset_secs, 16.0);
        assert_eq!(s1.video_in.to_string(), "v1");
        assert_eq!(s1.audio_in.to_string(), "a1");
        assert_eq!(s1.incoming, 2);
        assert_eq!(s1.video_out.to_string(), "v2");
        assert_eq!(s1.audio_out.to_string(), "a2");

        let (v, a) = plan.output_labels();
        assert_eq!((v.to_string(), a.to_string()), ("v2".into(), "a2".into()));
        assert_eq!(plan.total_duration_secs, 28.0);
        assert!(plan.warnings.is_empty());
    }

    #[test]
    fn two_clips() {
        let plan = build_plan(&[5.0, 5.0], 1.0).unwrap();
        assert_eq!(plan.stages.len(), 1);
        assert_eq!(plan.stages[0].offset_secs, 4.0);
        assert_eq!(plan.output_video, StreamLabel::Merged { index: 1, kind: MediaKind::Video });
        assert_eq!(plan.output_audio.to_string(), "a1");
        assert_eq!(plan.input_count(), 2);
    }

    #[test]
    fn too_few_clips() {
        for durations in [&[][..], &[4.0][..]] {
            let err = build_plan(durations, 1.0).unwrap_err();
            assert!(
                matches!(err, cf_core::Error::InsufficientClips { count } if count == durations.len()),
                "{err}"
            );
        }
    }

    #[test]
    fn non_positive_fade_is_rejected() {
        for fade in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = build_plan(&[5.0, 5.0], fade).unwrap_err();
            assert!(matches!(err, cf_core::Error::Validation(_)), "{fade}: {err}");
        }
    }

    #[test]
    fn invalid_duration_is_rejected() {
        let err = build_plan(&[5.0, f64::NAN, 3.0], 1.0).unwrap_err();
        assert!(err.to_string().contains("clip 1"), "{err}");
    }

    #[test]
    fn fade_overrun_is_kept_and_reported() {
        let plan = build_plan(&[0.5, 6.0, 1.0], 1.0).unwrap();
        // Offsets are left exactly as computed, even when negative.
        assert_eq!(plan.stages[0].offset_secs, -0.5);
        assert_eq!(plan.stages[1].offset_secs, 4.5);
        assert_eq!(
            plan.warnings,
            vec![
                PlanWarning::FadeOverrun { clip_index: 0, duration_secs: 0.5, fade_secs: 1.0 },
                PlanWarning::FadeOverrun { clip_index: 2, duration_secs: 1.0, fade_secs: 1.0 },
            ]
        );
    }

    #[test]
    fn filter_complex_rendering() {
        let plan = TransitionGraphBuilder::new(1.0)
            .transition(TransitionKind::Dissolve)
            .build(&[10.0, 8.0, 12.0])
            .unwrap();
        assert_eq!(
            plan.filter_complex(),
            "[0:v][1:v]xfade=transition=dissolve:duration=1:offset=9[v1];\
             [0:a][1:a]acrossfade=d=1[a1];\
             [v1][2:v]xfade=transition=dissolve:duration=1:offset=16[v2];\
             [a1][2:a]acrossfade=d=1[a2]"
        );
        assert_eq!(plan.map_args(), ["-map", "[v2]", "-map", "[a2]"].map(String::from));
    }

    #[test]
    fn fractional_values_render_compactly() {
        assert_eq!(format_secs(9.0), "9");
        assert_eq!(format_secs(16.5), "16.5");
        assert_eq!(format_secs(0.1 + 0.2), "0.3");
        assert_eq!(format_secs(-0.5), "-0.5");
        assert_eq!(format_secs(-0.0001), "0");
    }

    #[test]
    fn same_input_same_plan() {
        let durations = [3.25, 7.5, 2.0, 9.75];
        let a = build_plan(&durations, 0.75).unwrap();
        let b = build_plan(&durations, 0.75).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.filter_complex(), b.filter_complex());
    }

    #[test]
    fn random_sequences_follow_offset_recurrence() {
        let mut rng = StdRng::seed_from_u64(0x5eed);

        for _ in 0..500 {
            let n = rng.gen_range(2..=24);
            let fade = rng.gen_range(0.05..2.0);
            let durations: Vec<f64> = (0..n).map(|_| rng.gen_range(0.01..120.0)).collect();

            let plan = build_plan(&durations, fade).unwrap();
            assert_eq!(plan.stages.len(), n - 1);

            let first = &plan.stages[0];
            assert!((first.offset_secs - (durations[0] - fade)).abs() < 1e-9);
            assert_eq!(first.video_in, StreamLabel::input(0, MediaKind::Video));
            assert_eq!(first.audio_in, StreamLabel::input(0, MediaKind::Audio));

            for i in 1..plan.stages.len() {
                let prev = &plan.stages[i - 1];
                let cur = &plan.stages[i];
                let expected = prev.offset_secs + durations[i] - fade;
                assert!((cur.offset_secs - expected).abs() < 1e-9);
                // The chain is unbroken: each stage consumes its predecessor.
                assert_eq!(cur.video_in, prev.video_out);
                assert_eq!(cur.audio_in, prev.audio_out);
                assert_eq!(cur.incoming, i + 1);
            }

            let last = plan.stages.last().unwrap();
            assert_eq!(plan.output_labels(), (last.video_out, last.audio_out));
        }
    }

    #[test]
    fn labels_are_unique_across_long_chains() {
        let plan = build_plan(&vec![5.0; 64], 0.5).unwrap();
        let mut outputs: Vec<String> = plan
            .stages
            .iter()
            .flat_map(|s| [s.video_out.to_string(), s.audio_out.to_string()])
            .collect();
        let total = outputs.len();
        outputs.sort();
        outputs.dedup();
        assert_eq!(outputs.len(), total);
    }
}
