#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    PreviewRecompute,
    BuildTypesFill,
    BuildTypeSelect,
    MappingAdd,
    RowAdd,
    RowEdit,
    RowEvent,
    RowRemove,
    RowsClear,
    WidgetState,
    Tick,
    Unknown,
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "ping" => Command::Ping,
            "preview.recompute" => Command::PreviewRecompute,
            "build_types.fill" => Command::BuildTypesFill,
            "build_type.select" => Command::BuildTypeSelect,
            "mapping.add" => Command::MappingAdd,
            "row.add" => Command::RowAdd,
            "row.edit" => Command::RowEdit,
            "row.event" => Command::RowEvent,
            "row.remove" => Command::RowRemove,
            "rows.clear" => Command::RowsClear,
            "widget.state" => Command::WidgetState,
            "tick" => Command::Tick,
            _ => Command::Unknown,
        }
    }
}
