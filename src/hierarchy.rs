use crate::error::{Result, SelectionSheetError};
use crate::schema::{
    CompanyId, Grouping, GroupingId, LedgerLine, MajorHead, MajorHeadId, MinorHead, MinorHeadId,
    NodeStatus, StatementType,
};
use crate::utils::csv_field;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Major head → minor head → grouping classification for one company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterDataHierarchy {
    pub company_id: CompanyId,
    major_heads: BTreeMap<MajorHeadId, MajorHead>,
    minor_heads: BTreeMap<MinorHeadId, MinorHead>,
    groupings: BTreeMap<GroupingId, Grouping>,
}

impl MasterDataHierarchy {
    pub fn new(company_id: CompanyId) -> Self {
        Self {
            company_id,
            major_heads: BTreeMap::new(),
            minor_heads: BTreeMap::new(),
            groupings: BTreeMap::new(),
        }
    }

    pub fn add_major_head(
        &mut self,
        id: impl Into<MajorHeadId>,
        name: impl Into<String>,
        statement_type: StatementType,
    ) -> Result<()> {
        let id = id.into();
        if self.major_heads.contains_key(&id) {
            return Err(SelectionSheetError::InvalidHierarchy(format!(
                "Major head '{}' already exists",
                id
            )));
        }

        self.major_heads.insert(
            id.clone(),
            MajorHead {
                id,
                name: name.into(),
                statement_type,
                status: NodeStatus::Active,
            },
        );
        Ok(())
    }

    pub fn add_minor_head(
        &mut self,
        id: impl Into<MinorHeadId>,
        name: impl Into<String>,
        major_head_id: impl Into<MajorHeadId>,
    ) -> Result<()> {
        let id = id.into();
        let major_head_id = major_head_id.into();
        if self.minor_heads.contains_key(&id) {
            return Err(SelectionSheetError::InvalidHierarchy(format!(
                "Minor head '{}' already exists",
                id
            )));
        }

        match self.major_heads.get(&major_head_id) {
            Some(parent) if parent.status.is_active() => {}
            Some(_) => {
                return Err(SelectionSheetError::InvalidHierarchy(format!(
                    "Minor head '{}' cannot be added under inactive major head '{}'",
                    id, major_head_id
                )))
            }
            None => {
                return Err(SelectionSheetError::InvalidHierarchy(format!(
                    "Minor head '{}' references unknown major head '{}'",
                    id, major_head_id
                )))
            }
        }

        self.minor_heads.insert(
            id.clone(),
            MinorHead {
                id,
                name: name.into(),
                major_head_id,
                status: NodeStatus::Active,
            },
        );
        Ok(())
    }

    pub fn add_grouping(
        &mut self,
        id: impl Into<GroupingId>,
        name: impl Into<String>,
        minor_head_id: impl Into<MinorHeadId>,
    ) -> Result<()> {
        let id = id.into();
        let minor_head_id = minor_head_id.into();
        if self.groupings.contains_key(&id) {
            return Err(SelectionSheetError::InvalidHierarchy(format!(
                "Grouping '{}' already exists",
                id
            )));
        }

        match self.minor_heads.get(&minor_head_id) {
            Some(parent) if parent.status.is_active() => {}
            Some(_) => {
                return Err(SelectionSheetError::InvalidHierarchy(format!(
                    "Grouping '{}' cannot be added under inactive minor head '{}'",
                    id, minor_head_id
                )))
            }
            None => {
                return Err(SelectionSheetError::InvalidHierarchy(format!(
                    "Grouping '{}' references unknown minor head '{}'",
                    id, minor_head_id
                )))
            }
        }

        self.groupings.insert(
            id.clone(),
            Grouping {
                id,
                name: name.into(),
                minor_head_id,
                status: NodeStatus::Active,
            },
        );
        Ok(())
    }

    pub fn deactivate_major_head(&mut self, id: &MajorHeadId) -> Result<()> {
        self.set_major_status(id, NodeStatus::Inactive)
    }

    pub fn reactivate_major_head(&mut self, id: &MajorHeadId) -> Result<()> {
        self.set_major_status(id, NodeStatus::Active)
    }

    pub fn deactivate_minor_head(&mut self, id: &MinorHeadId) -> Result<()> {
        self.set_minor_status(id, NodeStatus::Inactive)
    }

    pub fn reactivate_minor_head(&mut self, id: &MinorHeadId) -> Result<()> {
        self.set_minor_status(id, NodeStatus::Active)
    }

    pub fn deactivate_grouping(&mut self, id: &GroupingId) -> Result<()> {
        self.set_grouping_status(id, NodeStatus::Inactive)
    }

    pub fn reactivate_grouping(&mut self, id: &GroupingId) -> Result<()> {
        self.set_grouping_status(id, NodeStatus::Active)
    }

    fn set_major_status(&mut self, id: &MajorHeadId, status: NodeStatus) -> Result<()> {
        let node = self.major_heads.get_mut(id).ok_or_else(|| {
            SelectionSheetError::InvalidHierarchy(format!("Unknown major head '{}'", id))
        })?;
        debug!("Major head '{}' status -> {:?}", id, status);
        node.status = status;
        Ok(())
    }

    fn set_minor_status(&mut self, id: &MinorHeadId, status: NodeStatus) -> Result<()> {
        let node = self.minor_heads.get_mut(id).ok_or_else(|| {
            SelectionSheetError::InvalidHierarchy(format!("Unknown minor head '{}'", id))
        })?;
        debug!("Minor head '{}' status -> {:?}", id, status);
        node.status = status;
        Ok(())
    }

    fn set_grouping_status(&mut self, id: &GroupingId, status: NodeStatus) -> Result<()> {
        let node = self.groupings.get_mut(id).ok_or_else(|| {
            SelectionSheetError::InvalidHierarchy(format!("Unknown grouping '{}'", id))
        })?;
        debug!("Grouping '{}' status -> {:?}", id, status);
        node.status = status;
        Ok(())
    }

    pub fn major_head(&self, id: &MajorHeadId) -> Option<&MajorHead> {
        self.major_heads.get(id)
    }

    pub fn minor_head(&self, id: &MinorHeadId) -> Option<&MinorHead> {
        self.minor_heads.get(id)
    }

    pub fn grouping(&self, id: &GroupingId) -> Option<&Grouping> {
        self.groupings.get(id)
    }

    pub fn major_heads(&self) -> impl Iterator<Item = &MajorHead> {
        self.major_heads.values()
    }

    pub fn minor_heads(&self) -> impl Iterator<Item = &MinorHead> {
        self.minor_heads.values()
    }

    pub fn groupings(&self) -> impl Iterator<Item = &Grouping> {
        self.groupings.values()
    }

    pub fn active_major_heads(&self) -> impl Iterator<Item = &MajorHead> {
        self.major_heads.values().filter(|h| h.status.is_active())
    }

    /// Checks that every classification reference on the line points at an active node and
    /// that the three references form a single branch of the hierarchy.
    pub fn validate_line(&self, line: &LedgerLine) -> Result<()> {
        let invalid = |details: String| SelectionSheetError::ValidationError {
            line: line.ledger_name.clone(),
            details,
        };

        let major = self
            .major_heads
            .get(&line.major_head_id)
            .filter(|h| h.status.is_active())
            .ok_or_else(|| {
                invalid(format!(
                    "major head '{}' is not an active major head for company {}",
                    line.major_head_id, self.company_id
                ))
            })?;

        let minor = self
            .minor_heads
            .get(&line.minor_head_id)
            .filter(|h| h.status.is_active())
            .ok_or_else(|| {
                invalid(format!(
                    "minor head '{}' is not an active minor head for company {}",
                    line.minor_head_id, self.company_id
                ))
            })?;

        let grouping = self
            .groupings
            .get(&line.grouping_id)
            .filter(|g| g.status.is_active())
            .ok_or_else(|| {
                invalid(format!(
                    "grouping '{}' is not an active grouping for company {}",
                    line.grouping_id, self.company_id
                ))
            })?;

        if minor.major_head_id != major.id {
            return Err(invalid(format!(
                "minor head '{}' belongs to major head '{}', not '{}'",
                minor.id, minor.major_head_id, major.id
            )));
        }

        if grouping.minor_head_id != minor.id {
            return Err(invalid(format!(
                "grouping '{}' belongs to minor head '{}', not '{}'",
                grouping.id, grouping.minor_head_id, minor.id
            )));
        }

        Ok(())
    }

    pub fn total_nodes(&self) -> usize {
        self.major_heads.len() + self.minor_heads.len() + self.groupings.len()
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_csv(&self) -> String {
        let mut output = String::new();
        output.push_str("Level,Id,Name,Parent,Status\n");

        for head in self.major_heads.values() {
            output.push_str(&format!(
                "Major,{},{},{},{:?}\n",
                csv_field(head.id.as_str()),
                csv_field(&head.name),
                head.statement_type,
                head.status
            ));
        }

        for head in self.minor_heads.values() {
            output.push_str(&format!(
                "Minor,{},{},{},{:?}\n",
                csv_field(head.id.as_str()),
                csv_field(&head.name),
                csv_field(head.major_head_id.as_str()),
                head.status
            ));
        }

        for grouping in self.groupings.values() {
            output.push_str(&format!(
                "Grouping,{},{},{},{:?}\n",
                csv_field(grouping.id.as_str()),
                csv_field(&grouping.name),
                csv_field(grouping.minor_head_id.as_str()),
                grouping.status
            ));
        }

        output
    }

    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# Master Data - {}\n\n", self.company_id));

        for major in self.major_heads.values() {
            output.push_str(&format!(
                "## {} ({}){}\n\n",
                major.name,
                major.statement_type,
                inactive_marker(major.status)
            ));

            for minor in self
                .minor_heads
                .values()
                .filter(|m| m.major_head_id == major.id)
            {
                output.push_str(&format!("- {}{}\n", minor.name, inactive_marker(minor.status)));

                for grouping in self
                    .groupings
                    .values()
                    .filter(|g| g.minor_head_id == minor.id)
                {
                    output.push_str(&format!(
                        "  - {}{}\n",
                        grouping.name,
                        inactive_marker(grouping.status)
                    ));
                }
            }
            output.push('\n');
        }

        output
    }
}

fn inactive_marker(status: NodeStatus) -> &'static str {
    match status {
        NodeStatus::Active => "",
        NodeStatus::Inactive => " **[INACTIVE]**",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn sample_hierarchy() -> MasterDataHierarchy {
        let mut hierarchy = MasterDataHierarchy::new("ACME".into());
        hierarchy
            .add_major_head("PPE", "Property, Plant & Equipment", StatementType::BalanceSheet)
            .unwrap();
        hierarchy.add_minor_head("PPE-T", "Tangible Assets", "PPE").unwrap();
        hierarchy.add_grouping("PPE-T-B", "Buildings", "PPE-T").unwrap();
        hierarchy
            .add_major_head("REV", "Revenue from Operations", StatementType::ProfitAndLoss)
            .unwrap();
        hierarchy.add_minor_head("REV-S", "Sale of Products", "REV").unwrap();
        hierarchy.add_grouping("REV-S-D", "Domestic Sales", "REV-S").unwrap();
        hierarchy
    }

    fn line(major: &str, minor: &str, grouping: &str) -> LedgerLine {
        LedgerLine {
            ledger_name: "Office Building".to_string(),
            opening_balance_cy: Decimal::new(500000, 0),
            debit_cy: Decimal::ZERO,
            credit_cy: Decimal::ZERO,
            closing_balance_cy: Decimal::new(500000, 0),
            closing_balance_py: Decimal::new(500000, 0),
            statement_type: StatementType::BalanceSheet,
            major_head_id: major.into(),
            minor_head_id: minor.into(),
            grouping_id: grouping.into(),
        }
    }

    #[test]
    fn test_hierarchy_creation() {
        let hierarchy = sample_hierarchy();
        assert_eq!(hierarchy.total_nodes(), 6);
        assert_eq!(hierarchy.active_major_heads().count(), 2);
        assert!(hierarchy.validate_line(&line("PPE", "PPE-T", "PPE-T-B")).is_ok());
    }

    #[test]
    fn test_duplicate_and_orphan_nodes_rejected() {
        let mut hierarchy = sample_hierarchy();
        assert!(matches!(
            hierarchy.add_major_head("PPE", "Again", StatementType::BalanceSheet),
            Err(SelectionSheetError::InvalidHierarchy(_))
        ));
        assert!(matches!(
            hierarchy.add_minor_head("X", "Orphan", "NOPE"),
            Err(SelectionSheetError::InvalidHierarchy(_))
        ));
        assert!(matches!(
            hierarchy.add_grouping("Y", "Orphan", "NOPE"),
            Err(SelectionSheetError::InvalidHierarchy(_))
        ));
    }

    #[test]
    fn test_soft_delete_keeps_node_but_blocks_references() {
        let mut hierarchy = sample_hierarchy();
        hierarchy.deactivate_grouping(&"PPE-T-B".into()).unwrap();

        let grouping = hierarchy.grouping(&"PPE-T-B".into()).unwrap();
        assert_eq!(grouping.status, NodeStatus::Inactive);
        assert_eq!(hierarchy.total_nodes(), 6);

        let result = hierarchy.validate_line(&line("PPE", "PPE-T", "PPE-T-B"));
        assert!(matches!(
            result,
            Err(SelectionSheetError::ValidationError { .. })
        ));

        hierarchy.reactivate_grouping(&"PPE-T-B".into()).unwrap();
        assert!(hierarchy.validate_line(&line("PPE", "PPE-T", "PPE-T-B")).is_ok());
    }

    #[test]
    fn test_inactive_parent_blocks_new_children() {
        let mut hierarchy = sample_hierarchy();
        hierarchy.deactivate_major_head(&"REV".into()).unwrap();
        assert!(hierarchy.add_minor_head("REV-O", "Other", "REV").is_err());
        assert_eq!(hierarchy.active_major_heads().count(), 1);
    }

    #[test]
    fn test_validate_line_rejects_crossed_branches() {
        let hierarchy = sample_hierarchy();

        let unknown = hierarchy.validate_line(&line("NOPE", "PPE-T", "PPE-T-B"));
        assert!(matches!(
            unknown,
            Err(SelectionSheetError::ValidationError { .. })
        ));

        let crossed = hierarchy.validate_line(&line("REV", "PPE-T", "PPE-T-B"));
        match crossed {
            Err(SelectionSheetError::ValidationError { line, details }) => {
                assert_eq!(line, "Office Building");
                assert!(details.contains("belongs to major head"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        let crossed_grouping = hierarchy.validate_line(&line("PPE", "PPE-T", "REV-S-D"));
        assert!(crossed_grouping.is_err());
    }

    #[test]
    fn test_unknown_node_status_change() {
        let mut hierarchy = sample_hierarchy();
        assert!(hierarchy.deactivate_minor_head(&"NOPE".into()).is_err());
    }

    #[test]
    fn test_hierarchy_to_markdown() {
        let mut hierarchy = sample_hierarchy();
        hierarchy.deactivate_minor_head(&"REV-S".into()).unwrap();
        let markdown = hierarchy.to_markdown();

        assert!(markdown.contains("# Master Data - ACME"));
        assert!(markdown.contains("## Property, Plant & Equipment (Balance Sheet)"));
        assert!(markdown.contains("  - Buildings"));
        assert!(markdown.contains("- Sale of Products **[INACTIVE]**"));
    }

    #[test]
    fn test_hierarchy_to_csv() {
        let hierarchy = sample_hierarchy();
        let csv = hierarchy.to_csv();

        assert!(csv.contains("Level,Id,Name,Parent,Status"));
        assert!(csv.contains("Minor,PPE-T,Tangible Assets,PPE,Active"));
        assert!(csv.contains("Grouping,REV-S-D,Domestic Sales,REV-S,Active"));
    }

    #[test]
    fn test_hierarchy_to_csv_quotes_names_with_commas() {
        let hierarchy = sample_hierarchy();
        let csv = hierarchy.to_csv();

        assert!(csv.contains("Major,PPE,\"Property, Plant & Equipment\",Balance Sheet,Active"));

        for row in csv.lines() {
            let mut fields = 1;
            let mut quoted = false;
            for c in row.chars() {
                match c {
                    '"' => quoted = !quoted,
                    ',' if !quoted => fields += 1,
                    _ => {}
                }
            }
            assert_eq!(fields, 5, "row has wrong field count: {}", row);
        }
    }
}
