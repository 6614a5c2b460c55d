//! Typed manifest instruction AST and renderer

use rust_decimal::Decimal;

use crate::manifest::value::ManifestValue;

/// Access rules placeholder passed to deposit methods (no authorized
/// depositor badge)
fn no_badge() -> ManifestValue {
    ManifestValue::Enum {
        discriminator: 0,
        fields: vec![],
    }
}

/// One manifest instruction
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    CallMethod {
        address: String,
        method: String,
        args: Vec<ManifestValue>,
    },
    CallFunction {
        package: String,
        blueprint: String,
        function: String,
        args: Vec<ManifestValue>,
    },
    TakeFromWorktop {
        resource: String,
        amount: Decimal,
        bucket: String,
    },
    TakeAllFromWorktop {
        resource: String,
        bucket: String,
    },
    AssertWorktopContains {
        resource: String,
        amount: Decimal,
    },
    CreateFungibleResource {
        divisibility: u8,
        initial_supply: Decimal,
        metadata: Vec<(String, String)>,
    },
    CreateNonFungibleResource {
        metadata: Vec<(String, String)>,
        initial_items: Vec<String>,
    },
}

impl Instruction {
    /// Render this instruction as manifest text, terminated by `;`
    pub fn render(&self) -> String {
        match self {
            Self::CallMethod {
                address,
                method,
                args,
            } => {
                let mut lines = vec![
                    "CALL_METHOD".to_string(),
                    format!("    Address(\"{}\")", address),
                    format!("    \"{}\"", method),
                ];
                lines.extend(args.iter().map(|a| format!("    {}", a.render())));
                lines.push(";".to_string());
                lines.join("\n")
            }
            Self::CallFunction {
                package,
                blueprint,
                function,
                args,
            } => {
                let mut lines = vec![
                    "CALL_FUNCTION".to_string(),
                    format!("    Address(\"{}\")", package),
                    format!("    \"{}\"", blueprint),
                    format!("    \"{}\"", function),
                ];
                lines.extend(args.iter().map(|a| format!("    {}", a.render())));
                lines.push(";".to_string());
                lines.join("\n")
            }
            Self::TakeFromWorktop {
                resource,
                amount,
                bucket,
            } => [
                "TAKE_FROM_WORKTOP".to_string(),
                format!("    Address(\"{}\")", resource),
                format!("    Decimal(\"{}\")", amount.normalize()),
                format!("    Bucket(\"{}\")", bucket),
                ";".to_string(),
            ]
            .join("\n"),
            Self::TakeAllFromWorktop { resource, bucket } => [
                "TAKE_ALL_FROM_WORKTOP".to_string(),
                format!("    Address(\"{}\")", resource),
                format!("    Bucket(\"{}\")", bucket),
                ";".to_string(),
            ]
            .join("\n"),
            Self::AssertWorktopContains { resource, amount } => [
                "ASSERT_WORKTOP_CONTAINS".to_string(),
                format!("    Address(\"{}\")", resource),
                format!("    Decimal(\"{}\")", amount.normalize()),
                ";".to_string(),
            ]
            .join("\n"),
            Self::CreateFungibleResource {
                divisibility,
                initial_supply,
                metadata,
            } => {
                let meta = ManifestValue::Map {
                    value_type: "String".to_string(),
                    entries: metadata
                        .iter()
                        .map(|(k, v)| (k.clone(), ManifestValue::String(v.clone())))
                        .collect(),
                };
                [
                    "CREATE_FUNGIBLE_RESOURCE_WITH_INITIAL_SUPPLY".to_string(),
                    format!("    {}", no_badge().render()),
                    "    true".to_string(),
                    format!("    {}u8", divisibility),
                    format!("    Decimal(\"{}\")", initial_supply.normalize()),
                    format!("    {}", meta.render()),
                    format!("    {}", ManifestValue::None.render()),
                    ";".to_string(),
                ]
                .join("\n")
            }
            Self::CreateNonFungibleResource {
                metadata,
                initial_items,
            } => {
                let meta = ManifestValue::Map {
                    value_type: "String".to_string(),
                    entries: metadata
                        .iter()
                        .map(|(k, v)| (k.clone(), ManifestValue::String(v.clone())))
                        .collect(),
                };
                let items = ManifestValue::Array {
                    element_type: "String".to_string(),
                    elements: initial_items
                        .iter()
                        .map(|i| ManifestValue::String(i.clone()))
                        .collect(),
                };
                [
                    "CREATE_NON_FUNGIBLE_RESOURCE_WITH_INITIAL_SUPPLY".to_string(),
                    format!("    {}", no_badge().render()),
                    "    true".to_string(),
                    format!("    {}", meta.render()),
                    format!("    {}", items.render()),
                    format!("    {}", ManifestValue::None.render()),
                    ";".to_string(),
                ]
                .join("\n")
            }
        }
    }
}

/// An ordered, immutable instruction sequence.
///
/// Built once per request; never mutated in place. A new financial action
/// always assembles the full sequence from scratch.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    instructions: Vec<Instruction>,
}

impl Manifest {
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Render the full manifest as text
    pub fn render(&self) -> String {
        let mut out = self
            .instructions
            .iter()
            .map(Instruction::render)
            .collect::<Vec<_>>()
            .join("\n");
        out.push('\n');
        out
    }

    /// Count instructions matching a predicate (test/assertion helper)
    pub fn count_matching(&self, pred: impl Fn(&Instruction) -> bool) -> usize {
        self.instructions.iter().filter(|i| pred(i)).count()
    }
}

/// Incremental manifest builder with automatic bucket naming
#[derive(Debug, Default)]
pub struct ManifestBuilder {
    instructions: Vec<Instruction>,
    bucket_counter: u32,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock a fee from `account`'s XRD vault. Always the first instruction
    /// of a money-moving manifest.
    pub fn lock_fee(mut self, account: &str, amount: Decimal) -> Self {
        self.instructions.push(Instruction::CallMethod {
            address: account.to_string(),
            method: "lock_fee".to_string(),
            args: vec![ManifestValue::decimal(amount)],
        });
        self
    }

    /// Withdraw `amount` of `resource` from `account` onto the worktop
    pub fn withdraw(mut self, account: &str, resource: &str, amount: Decimal) -> Self {
        self.instructions.push(Instruction::CallMethod {
            address: account.to_string(),
            method: "withdraw".to_string(),
            args: vec![
                ManifestValue::Address(resource.to_string()),
                ManifestValue::decimal(amount),
            ],
        });
        self
    }

    /// Move `amount` of `resource` from the worktop into a fresh bucket;
    /// returns the bucket name for use as a later call argument
    pub fn take_from_worktop(mut self, resource: &str, amount: Decimal) -> (Self, String) {
        self.bucket_counter += 1;
        let bucket = format!("bucket{}", self.bucket_counter);
        self.instructions.push(Instruction::TakeFromWorktop {
            resource: resource.to_string(),
            amount,
            bucket: bucket.clone(),
        });
        (self, bucket)
    }

    /// Move everything of `resource` from the worktop into a fresh bucket
    pub fn take_all_from_worktop(mut self, resource: &str) -> (Self, String) {
        self.bucket_counter += 1;
        let bucket = format!("bucket{}", self.bucket_counter);
        self.instructions.push(Instruction::TakeAllFromWorktop {
            resource: resource.to_string(),
            bucket: bucket.clone(),
        });
        (self, bucket)
    }

    pub fn assert_worktop_contains(mut self, resource: &str, amount: Decimal) -> Self {
        self.instructions.push(Instruction::AssertWorktopContains {
            resource: resource.to_string(),
            amount,
        });
        self
    }

    pub fn call_method(mut self, address: &str, method: &str, args: Vec<ManifestValue>) -> Self {
        self.instructions.push(Instruction::CallMethod {
            address: address.to_string(),
            method: method.to_string(),
            args,
        });
        self
    }

    pub fn call_function(
        mut self,
        package: &str,
        blueprint: &str,
        function: &str,
        args: Vec<ManifestValue>,
    ) -> Self {
        self.instructions.push(Instruction::CallFunction {
            package: package.to_string(),
            blueprint: blueprint.to_string(),
            function: function.to_string(),
            args,
        });
        self
    }

    /// Deposit one bucket into `account`, aborting if the account refuses it
    pub fn try_deposit_or_abort(mut self, account: &str, bucket: String) -> Self {
        self.instructions.push(Instruction::CallMethod {
            address: account.to_string(),
            method: "try_deposit_or_abort".to_string(),
            args: vec![ManifestValue::Bucket(bucket), no_badge()],
        });
        self
    }

    /// Deposit everything remaining on the worktop back into `account`,
    /// aborting the transaction if the account refuses any of it
    pub fn try_deposit_entire_worktop(mut self, account: &str) -> Self {
        self.instructions.push(Instruction::CallMethod {
            address: account.to_string(),
            method: "try_deposit_batch_or_abort".to_string(),
            args: vec![
                ManifestValue::Expression("ENTIRE_WORKTOP".to_string()),
                no_badge(),
            ],
        });
        self
    }

    pub fn create_fungible_resource(
        mut self,
        divisibility: u8,
        initial_supply: Decimal,
        metadata: Vec<(String, String)>,
    ) -> Self {
        self.instructions.push(Instruction::CreateFungibleResource {
            divisibility,
            initial_supply,
            metadata,
        });
        self
    }

    pub fn create_non_fungible_resource(
        mut self,
        metadata: Vec<(String, String)>,
        initial_items: Vec<String>,
    ) -> Self {
        self.instructions
            .push(Instruction::CreateNonFungibleResource {
                metadata,
                initial_items,
            });
        self
    }

    /// Seal the instruction sequence
    pub fn build(self) -> Manifest {
        Manifest {
            instructions: self.instructions,
        }
    }
}
