//! Known primitive kinds and how each one is drawn.

// ---------------------------------------------------------------------------
// Icon
// ---------------------------------------------------------------------------

/// Glyph drawn in a node header and in the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Icon {
    Clock,
    FileText,
    Database,
    Globe,
    Shield,
    Terminal,
    MessageSquare,
    Zap,
    Box,
}

impl Icon {
    /// Icon-set name of the glyph.
    pub fn name(self) -> &'static str {
        match self {
            Self::Clock => "clock",
            Self::FileText => "file-text",
            Self::Database => "database",
            Self::Globe => "globe",
            Self::Shield => "shield",
            Self::Terminal => "terminal",
            Self::MessageSquare => "message-square",
            Self::Zap => "zap",
            Self::Box => "box",
        }
    }
}

// ---------------------------------------------------------------------------
// Appearance
// ---------------------------------------------------------------------------

/// Icon and color classes for one node type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Appearance {
    pub icon: Icon,
    pub text_color: &'static str,
    pub border_color: &'static str,
}

impl Appearance {
    /// Used for any type the catalog does not know (or no longer knows).
    pub const FALLBACK: Appearance = Appearance {
        icon: Icon::Box,
        text_color: "text-slate-400",
        border_color: "border-slate-500/50",
    };
}

// ---------------------------------------------------------------------------
// PrimitiveKind
// ---------------------------------------------------------------------------

/// Primitives the editor has a dedicated appearance for.
///
/// Anything else the engine advertises is still placeable; it simply renders
/// with [`Appearance::FALLBACK`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    CronTrigger,
    DocumentIntelligence,
    SuperCompute,
    NetworkManager,
    SecurityGuardian,
    HalInterface,
    ChatbotEngine,
    ProvisioningSystem,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 8] = [
        Self::CronTrigger,
        Self::DocumentIntelligence,
        Self::SuperCompute,
        Self::NetworkManager,
        Self::SecurityGuardian,
        Self::HalInterface,
        Self::ChatbotEngine,
        Self::ProvisioningSystem,
    ];

    /// Resolve a wire identifier. Matching is exact (case-sensitive).
    pub fn parse(type_id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == type_id)
    }

    /// Wire identifier, as used by the execution engine.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CronTrigger => "CronTrigger",
            Self::DocumentIntelligence => "DocumentIntelligence",
            Self::SuperCompute => "SuperCompute",
            Self::NetworkManager => "NetworkManager",
            Self::SecurityGuardian => "SecurityGuardian",
            Self::HalInterface => "HALInterface",
            Self::ChatbotEngine => "ChatbotEngine",
            Self::ProvisioningSystem => "ProvisioningSystem",
        }
    }

    /// Trigger primitives start a workflow rather than process data.
    pub fn is_trigger(self) -> bool {
        matches!(self, Self::CronTrigger)
    }

    pub fn appearance(self) -> Appearance {
        let (icon, text_color, border_color) = match self {
            Self::CronTrigger => (Icon::Clock, "text-yellow-300", "border-yellow-500/50"),
            Self::DocumentIntelligence => (Icon::FileText, "text-blue-400", "border-blue-500/50"),
            Self::SuperCompute => (Icon::Database, "text-emerald-400", "border-emerald-500/50"),
            Self::NetworkManager => (Icon::Globe, "text-cyan-400", "border-cyan-500/50"),
            Self::SecurityGuardian => (Icon::Shield, "text-red-400", "border-red-500/50"),
            Self::HalInterface => (Icon::Terminal, "text-amber-400", "border-amber-500/50"),
            Self::ChatbotEngine => (
                Icon::MessageSquare,
                "text-stardust-violet",
                "border-stardust-violet/50",
            ),
            Self::ProvisioningSystem => (Icon::Zap, "text-pink-400", "border-pink-500/50"),
        };
        Appearance { icon, text_color, border_color }
    }
}

impl std::fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
