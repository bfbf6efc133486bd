//! Codec configuration and the builder that assembles an instance.

use tracing::warn;

use crate::api::Polycode;

/// Which runtimes must be able to decode the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    /// Same-runtime mode: local shortcuts allowed, no cross-language
    /// metadata guarantees.
    SameRuntime,
    /// Cross-language mode: strict portable wire layout. Forces string
    /// reference tracking so strings stay shareable across languages.
    Cross,
}

/// Wire encoding for 64-bit integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LongEncoding {
    /// Small-long-integer: 4 bytes when the value fits signed 31 bits,
    /// 9 bytes otherwise.
    Sli,
    /// Always 8 raw little-endian bytes.
    LeRawBytes,
    /// Progressive variable length (ZigZag + VarUint64).
    Pvl,
}

/// Schema evolution stance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompatibleMode {
    /// Writer and reader share the exact schema; version hashes may be
    /// emitted and checked.
    SchemaConsistent,
    /// Schemas may drift; version hash emission and validation are
    /// suppressed entirely.
    Compatible,
}

/// Immutable configuration snapshot held by a codec instance.
#[derive(Debug, Clone)]
pub struct Config {
    /// Runtime scope of the stream.
    pub language: Language,
    /// Master switch for the reference resolver.
    pub track_ref: bool,
    /// Suppress reference tracking for bool/integer/float values.
    pub ignore_basic_types_ref: bool,
    /// Suppress reference tracking for strings.
    pub ignore_string_ref: bool,
    /// Suppress reference tracking for duration/timestamp/date values.
    pub ignore_time_ref: bool,
    /// VarInt32 encoding for 32-bit integers.
    pub compress_int: bool,
    /// Encoding for 64-bit integers.
    pub long_encoding: LongEncoding,
    /// Shorter encoding for ASCII-only strings.
    pub compress_string: bool,
    /// Schema evolution stance.
    pub compatible_mode: CompatibleMode,
    /// Emit and validate per-class version hashes. Forced off by
    /// [`CompatibleMode::Compatible`].
    pub check_class_version: bool,
    /// Reject serialization of unregistered user types.
    pub require_class_registration: bool,
    /// Fabricate placeholders when decoding unknown namespaced types.
    pub deserialize_unexistent_class: bool,
    /// Keep the meta-string token state across messages on this instance.
    pub share_meta_context: bool,
    /// Recursion bound enforced when reference tracking is off.
    pub max_recursion_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: Language::SameRuntime,
            track_ref: false,
            ignore_basic_types_ref: true,
            ignore_string_ref: true,
            ignore_time_ref: true,
            compress_int: true,
            long_encoding: LongEncoding::Sli,
            compress_string: true,
            compatible_mode: CompatibleMode::SchemaConsistent,
            check_class_version: false,
            require_class_registration: true,
            deserialize_unexistent_class: false,
            share_meta_context: false,
            max_recursion_depth: 256,
        }
    }
}

/// Builder configuring and creating a [`Polycode`] instance.
///
/// ```rust
/// use polycode::{Polycode, config::Language};
///
/// let codec = Polycode::builder()
///     .with_language(Language::Cross)
///     .with_ref_tracking(true)
///     .build();
/// # let _ = codec;
/// ```
#[derive(Debug, Default)]
pub struct PolycodeBuilder {
    config: Config,
}

impl PolycodeBuilder {
    /// Starts from the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether to serialize for cross-language decoding. Same-runtime mode
    /// has better performance.
    pub fn with_language(mut self, language: Language) -> Self {
        self.config.language = language;
        self
    }

    /// Whether to track shared or circular references.
    pub fn with_ref_tracking(mut self, track: bool) -> Self {
        self.config.track_ref = track;
        self
    }

    /// Whether to ignore shared references between basic-type values.
    pub fn ignore_basic_types_ref(mut self, ignore: bool) -> Self {
        self.config.ignore_basic_types_ref = ignore;
        self
    }

    /// Whether to ignore shared references between strings.
    pub fn ignore_string_ref(mut self, ignore: bool) -> Self {
        self.config.ignore_string_ref = ignore;
        self
    }

    /// Whether to ignore shared references between time values.
    pub fn ignore_time_ref(mut self, ignore: bool) -> Self {
        self.config.ignore_time_ref = ignore;
        self
    }

    /// Variable-length encoding for both ints and longs (longs switch to
    /// SLI).
    pub fn with_number_compressed(mut self, compressed: bool) -> Self {
        self.config.compress_int = compressed;
        self.config.long_encoding = if compressed {
            LongEncoding::Sli
        } else {
            LongEncoding::LeRawBytes
        };
        self
    }

    /// Variable-length encoding for 32-bit integers.
    pub fn with_int_compressed(mut self, compressed: bool) -> Self {
        self.config.compress_int = compressed;
        self
    }

    /// Wire encoding for 64-bit integers.
    pub fn with_long_encoding(mut self, encoding: LongEncoding) -> Self {
        self.config.long_encoding = encoding;
        self
    }

    /// Shorter encoding for ASCII-only strings.
    pub fn with_string_compressed(mut self, compressed: bool) -> Self {
        self.config.compress_string = compressed;
        self
    }

    /// Schema evolution stance.
    pub fn with_compatible_mode(mut self, mode: CompatibleMode) -> Self {
        self.config.compatible_mode = mode;
        self
    }

    /// Whether to emit and check per-class version hashes. Disabled
    /// automatically when [`CompatibleMode::Compatible`] is selected.
    pub fn with_class_version_check(mut self, check: bool) -> Self {
        self.config.check_class_version = check;
        self
    }

    /// Whether serialization requires registered types. Disabling this
    /// relaxes decode-side safety; prefer installing a type checker when
    /// you must.
    pub fn require_class_registration(mut self, require: bool) -> Self {
        self.config.require_class_registration = require;
        self
    }

    /// Whether to fabricate placeholder values for unknown namespaced types
    /// on decode.
    pub fn with_deserialize_unexistent_class(mut self, fabricate: bool) -> Self {
        self.config.deserialize_unexistent_class = fabricate;
        self
    }

    /// Whether to reuse the meta-string token state across messages on the
    /// same instance.
    pub fn with_meta_context_share(mut self, share: bool) -> Self {
        self.config.share_meta_context = share;
        self
    }

    /// Recursion bound enforced while reference tracking is off.
    pub fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        self.config.max_recursion_depth = depth;
        self
    }

    /// Applies the cross-flag fix-ups and builds the codec instance.
    pub fn build(mut self) -> Polycode {
        self.finish();
        Polycode::with_config(self.config)
    }

    fn finish(&mut self) {
        if self.config.language != Language::SameRuntime {
            // Strings must stay shareable across languages.
            self.config.ignore_string_ref = false;
        }
        if self.config.compatible_mode == CompatibleMode::Compatible {
            self.config.check_class_version = false;
        }
        if !self.config.require_class_registration {
            warn!(
                "Class registration isn't required; unknown types may be deserialized. \
                 Install a type checker if the input is untrusted."
            );
        }
    }
}
