use indexmap::IndexMap;

/// Functional category of a primitive cell type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellCategory {
    Logical,
    Arithmetic,
    Bitwise,
    Comparison,
    Multiplexer,
    Retention,
    Reduction,
    Shift,
    Dedicated,
}

/// Canonical port-role assignment of one primitive cell type.
///
/// The three port-name lists are disjoint. `signal_changer` marks cells whose
/// output is a transformed function of the input rather than a retained or
/// routed copy.
#[derive(Debug, Clone)]
pub struct CellInfo {
    ty: &'static str,
    category: CellCategory,
    signal_changer: bool,
    data_inputs: Vec<&'static str>,
    select_inputs: Vec<&'static str>,
    outputs: Vec<&'static str>,
}

impl CellInfo {
    pub fn ty(&self) -> &str {
        self.ty
    }

    pub fn category(&self) -> CellCategory {
        self.category
    }

    pub fn is_signal_changer(&self) -> bool {
        self.signal_changer
    }

    pub fn is_data_input(&self, port_name: &str) -> bool {
        self.data_inputs.contains(&port_name)
    }

    pub fn is_select_input(&self, port_name: &str) -> bool {
        self.select_inputs.contains(&port_name)
    }

    pub fn is_output(&self, port_name: &str) -> bool {
        self.outputs.contains(&port_name)
    }

    pub fn data_inputs(&self) -> &[&'static str] {
        &self.data_inputs
    }

    pub fn select_inputs(&self) -> &[&'static str] {
        &self.select_inputs
    }

    pub fn outputs(&self) -> &[&'static str] {
        &self.outputs
    }
}

/// Static table mapping known primitive cell types to their port roles.
///
/// This is the ground truth for "is this port a control port" for every
/// non-placeholder node. Built once and shared by reference with every graph
/// that needs it; immutable after construction.
#[derive(Debug)]
pub struct CellCatalog {
    cells: IndexMap<&'static str, CellInfo>,
}

impl CellCatalog {
    pub fn new() -> CellCatalog {
        let mut catalog = CellCatalog { cells: IndexMap::new() };

        catalog.unary("$pos", CellCategory::Arithmetic);
        catalog.unary("$neg", CellCategory::Arithmetic);

        catalog.unary("$reduce_and", CellCategory::Reduction);
        catalog.unary("$reduce_or", CellCategory::Reduction);
        catalog.unary("$reduce_bool", CellCategory::Reduction);
        catalog.unary("$reduce_xor", CellCategory::Reduction);
        catalog.unary("$reduce_xnor", CellCategory::Reduction);

        catalog.unary("$not", CellCategory::Bitwise);
        catalog.binary("$and", CellCategory::Bitwise);
        catalog.binary("$or", CellCategory::Bitwise);
        catalog.binary("$xor", CellCategory::Bitwise);
        catalog.binary("$xnor", CellCategory::Bitwise);

        catalog.binary("$shl", CellCategory::Shift);
        catalog.binary("$shr", CellCategory::Shift);
        catalog.binary("$sshl", CellCategory::Shift);
        catalog.binary("$sshr", CellCategory::Shift);
        catalog.binary("$shift", CellCategory::Shift);
        catalog.binary("$shiftx", CellCategory::Shift);

        catalog.binary("$lt", CellCategory::Comparison);
        catalog.binary("$le", CellCategory::Comparison);
        catalog.binary("$eq", CellCategory::Comparison);
        catalog.binary("$ne", CellCategory::Comparison);
        catalog.binary("$eqx", CellCategory::Comparison);
        catalog.binary("$nex", CellCategory::Comparison);
        catalog.binary("$ge", CellCategory::Comparison);
        catalog.binary("$gt", CellCategory::Comparison);

        catalog.binary("$add", CellCategory::Arithmetic);
        catalog.binary("$sub", CellCategory::Arithmetic);
        catalog.binary("$mul", CellCategory::Arithmetic);
        catalog.binary("$div", CellCategory::Arithmetic);
        catalog.binary("$mod", CellCategory::Arithmetic);
        catalog.binary("$pow", CellCategory::Arithmetic);

        catalog.binary("$logic_and", CellCategory::Logical);
        catalog.binary("$logic_or", CellCategory::Logical);
        catalog.unary("$logic_not", CellCategory::Logical);

        catalog.unary("$slice", CellCategory::Dedicated);
        catalog.binary("$concat", CellCategory::Dedicated);

        catalog.binary("$macc", CellCategory::Comparison);
        catalog.binary("$equiv", CellCategory::Comparison);

        catalog.unary("$lut", CellCategory::Dedicated);
        catalog.unary("$sop", CellCategory::Logical);

        catalog.mux("$mux");
        catalog.mux("$pmux");

        catalog.cell("$lcu", CellCategory::Dedicated, true, vec!["\\P", "\\G", "\\CI"], vec![], vec!["\\CO"]);
        catalog.cell(
            "$alu",
            CellCategory::Dedicated,
            true,
            vec!["\\A", "\\B", "\\CI", "\\BI"],
            vec![],
            vec!["\\X", "\\Y", "\\CO"],
        );
        catalog.cell("$fa", CellCategory::Dedicated, true, vec!["\\A", "\\B", "\\C"], vec![], vec!["\\X", "\\Y"]);

        catalog.cell("$tribuf", CellCategory::Retention, false, vec!["\\A"], vec!["\\EN"], vec!["\\Y"]);
        catalog.cell("$sr", CellCategory::Retention, false, vec!["\\SET"], vec!["\\CLR"], vec!["\\Y"]);

        catalog.cell("$ff", CellCategory::Retention, false, vec!["\\D"], vec![], vec!["\\Q"]);
        catalog.cell("$dff", CellCategory::Retention, false, vec!["\\D"], vec!["\\CLK"], vec!["\\Q"]);
        catalog.cell("$dffe", CellCategory::Retention, false, vec!["\\D"], vec!["\\CLK", "\\EN"], vec!["\\Q"]);
        catalog.cell("$dffsr", CellCategory::Retention, false, vec!["\\D"], vec!["\\CLK", "\\CLR", "\\SET"], vec![
            "\\Q",
        ]);
        catalog.cell("$adff", CellCategory::Retention, false, vec!["\\D"], vec!["\\CLK", "\\ARST"], vec!["\\Q"]);
        catalog.cell("$dlatch", CellCategory::Retention, false, vec!["\\D"], vec!["\\EN"], vec!["\\Q"]);
        catalog.cell("$dlatchsr", CellCategory::Retention, false, vec!["\\D"], vec!["\\EN", "\\SET", "\\CLR"], vec![
            "\\Q",
        ]);

        catalog.cell("$memrd", CellCategory::Retention, false, vec!["\\ADDR"], vec!["\\EN", "\\CLK"], vec!["\\DATA"]);
        catalog.cell("$memwr", CellCategory::Retention, false, vec!["\\ADDR"], vec!["\\EN", "\\CLK"], vec!["\\DATA"]);
        catalog.cell(
            "$mem",
            CellCategory::Retention,
            false,
            vec!["\\RD_ADDR", "\\WR_ADDR", "\\WR_DATA"],
            vec!["\\RD_CLK", "\\RD_EN", "\\WR_CLK", "\\WR_EN"],
            vec!["\\RD_DATA"],
        );

        catalog.cell("$fsm", CellCategory::Dedicated, false, vec!["\\CTRL_IN"], vec!["\\CLK", "\\ARST"], vec![
            "\\CTRL_OUT",
        ]);

        catalog
    }

    fn cell(
        &mut self,
        ty: &'static str,
        category: CellCategory,
        signal_changer: bool,
        data_inputs: Vec<&'static str>,
        select_inputs: Vec<&'static str>,
        outputs: Vec<&'static str>,
    ) {
        self.cells.insert(ty, CellInfo { ty, category, signal_changer, data_inputs, select_inputs, outputs });
    }

    fn unary(&mut self, ty: &'static str, category: CellCategory) {
        self.cell(ty, category, true, vec!["\\A"], vec![], vec!["\\Y"]);
    }

    fn binary(&mut self, ty: &'static str, category: CellCategory) {
        self.cell(ty, category, true, vec!["\\A", "\\B"], vec![], vec!["\\Y"]);
    }

    fn mux(&mut self, ty: &'static str) {
        self.cell(ty, CellCategory::Multiplexer, false, vec!["\\A", "\\B"], vec!["\\S"], vec!["\\Y"]);
    }

    pub fn get(&self, ty: &str) -> Option<&CellInfo> {
        self.cells.get(ty)
    }

    pub fn contains(&self, ty: &str) -> bool {
        self.cells.contains_key(ty)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Default for CellCatalog {
    fn default() -> CellCatalog {
        CellCatalog::new()
    }
}
