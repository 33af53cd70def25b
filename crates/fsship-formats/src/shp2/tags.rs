//! Section and sub-record tags
//!
//! Tags are four ASCII characters packed big-endian into a `u32`. Each
//! nesting level has its own closed set of tags; values outside the set
//! decode as `Unknown` and are skipped by readers.

/// Pack four ASCII characters into a tag
pub const fn make_tag(code: &[u8; 4]) -> u32 {
    u32::from_be_bytes(*code)
}

/// Tag terminating a record sequence at every level
pub const TAIL_TAG: u32 = 0xFFFF_FFFF;

macro_rules! tag_set {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $code:literal, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )*
            /// End of the record sequence
            Tail,
            /// Tag not known to this reader
            Unknown(u32),
        }

        impl $name {
            /// On-disk tag value
            pub const fn value(self) -> u32 {
                match self {
                    $( Self::$variant => make_tag($code), )*
                    Self::Tail => TAIL_TAG,
                    Self::Unknown(value) => value,
                }
            }

            /// Tag for an on-disk value
            pub const fn from_value(value: u32) -> Self {
                $(
                    if value == make_tag($code) {
                        return Self::$variant;
                    }
                )*
                if value == TAIL_TAG {
                    return Self::Tail;
                }
                Self::Unknown(value)
            }
        }

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                Self::from_value(value)
            }
        }
    };
}

tag_set! {
    /// Top-level section tags
    MainSectionTag {
        /// Producer version, grid size and layer flags
        ShipAttributes = b"ATT1",
        /// Ship metadata
        Metadata = b"MET1",
        /// Physics parameters
        PhysicsData = b"PHS1",
        /// Auto-texturization settings
        AutoTexturizationSettings = b"ATX1",
        /// Structural layer
        StructuralLayer = b"STR1",
        /// Electrical layer
        ElectricalLayer = b"ELC1",
        /// Rope layer
        RopesLayer = b"RPS1",
        /// Texture layer as PNG
        TextureLayerPng = b"TXP1",
        /// Generated preview as PNG
        PreviewPng = b"PVP1",
    }
}

tag_set! {
    /// Sub-record tags of the attributes section
    ShipAttributesTag {
        /// Legacy producer version (major, minor)
        FsVersion1 = b"FSV1",
        /// Producer version (major, minor, patch, build)
        FsVersion2 = b"FSV2",
        /// Grid width and height
        ShipSize = b"SSZ1",
        /// Whether a texture layer is present
        HasTextureLayer = b"HTX1",
        /// Whether an electrical layer is present
        HasElectricalLayer = b"HEL1",
        /// Save time in Unix seconds
        LastWriteTime = b"WRT1",
    }
}

tag_set! {
    /// Sub-record tags of the metadata section
    MetadataTag {
        /// Ship name
        ShipName = b"NAM1",
        /// Author
        Author = b"AUT1",
        /// Art credits
        ArtCredits = b"ACR1",
        /// Year built
        YearBuilt = b"YRB1",
        /// Category
        Category = b"CAT1",
        /// Description
        Description = b"DES1",
        /// Ship-to-world scale
        Scale = b"SCL1",
        /// Password hash
        Password = b"PPP1",
        /// Hide electricals in previews
        DoHideElectricalsInPreview = b"HEP1",
        /// Hide texture in previews
        DoHideHdInPreview = b"HHP1",
    }
}

tag_set! {
    /// Sub-record tags of the physics section
    PhysicsDataTag {
        /// Horizontal offset
        OffsetX = b"OFX1",
        /// Vertical offset
        OffsetY = b"OFY1",
        /// Internal pressure
        InternalPressure = b"IPR1",
    }
}

tag_set! {
    /// Sub-record tags of the auto-texturization section
    AutoTexturizationTag {
        /// Mode
        Mode = b"MDE1",
        /// Material texture magnification
        MaterialTextureMagnification = b"MTM1",
        /// Material texture transparency
        MaterialTextureTransparency = b"MTT1",
    }
}

tag_set! {
    /// Sub-record tags of the structural layer section
    StructuralLayerTag {
        /// Run-length encoded cells
        Buffer = b"BUF1",
    }
}

tag_set! {
    /// Sub-record tags of the electrical layer section
    ElectricalLayerTag {
        /// Run-length encoded cells
        Buffer = b"BUF1",
        /// Electrical panel
        Panel = b"PNL1",
    }
}

tag_set! {
    /// Sub-record tags of the rope layer section
    RopesLayerTag {
        /// Rope list
        Buffer = b"BUF1",
    }
}
