//! Status enums mirroring the seeded `generation_statuses` table.

/// Raw status id as stored in `status_id` columns.
pub type StatusId = i16;

/// Define a status enum whose discriminants match a seeded lookup table.
macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident = $id:literal => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[repr(i16)]
        pub enum $name {
            $($variant = $id),+
        }

        impl $name {
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Wire label, identical to the `name` column of the lookup
            /// table.
            pub fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }

            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $($id => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value.id()
            }
        }
    };
}

define_status_enum! {
    /// Lifecycle of a generation run.
    ///
    /// `Failed` halts the run but keeps it resumable: re-invoking the
    /// batch entrypoint re-claims and retries from the pinned day.
    /// `Completed` and `Cancelled` are terminal.
    RunStatus {
        Pending = 1 => "pending",
        Generating = 2 => "generating",
        Completed = 3 => "completed",
        Failed = 4 => "failed",
        Cancelled = 5 => "cancelled",
    }
}

impl RunStatus {
    /// Statuses from which a batch invocation may claim the run.
    pub fn is_claimable(self) -> bool {
        matches!(self, Self::Pending | Self::Failed)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}
