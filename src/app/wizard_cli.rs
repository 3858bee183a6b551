//! Line-oriented rendition of the estimate calculator for the `estimate` subcommand.

use crate::core::wizard::{EstimateWizard, WizardStep};
use crate::domain::model::{AreaUnits, BusinessCategory, EstimateOption, Lead};
use crate::domain::ports::LeadRepository;
use crate::utils::error::{Result, SiteError};
use std::io::{BufRead, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardCommand {
    Help,
    Category(BusinessCategory),
    Area(u32),
    ToggleOption(EstimateOption),
    Next,
    Back,
    Show,
    Request,
    Name(String),
    Phone(String),
    Email(String),
    Message(String),
    Cancel,
    Submit,
    Quit,
}

impl WizardCommand {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb.to_lowercase().as_str() {
            "help" | "?" => WizardCommand::Help,
            "category" | "c" => WizardCommand::Category(rest.parse()?),
            "area" | "a" => WizardCommand::Area(rest.parse().map_err(|_| {
                SiteError::InvalidInput {
                    field: "area".to_string(),
                    value: rest.to_string(),
                    reason: "Area must be a whole number".to_string(),
                }
            })?),
            "option" | "o" => WizardCommand::ToggleOption(rest.parse()?),
            "next" | "n" => WizardCommand::Next,
            "back" | "b" => WizardCommand::Back,
            "show" | "s" => WizardCommand::Show,
            "request" | "r" => WizardCommand::Request,
            "name" => WizardCommand::Name(rest.to_string()),
            "phone" => WizardCommand::Phone(rest.to_string()),
            "email" => WizardCommand::Email(rest.to_string()),
            "message" => WizardCommand::Message(rest.to_string()),
            "cancel" => WizardCommand::Cancel,
            "submit" => WizardCommand::Submit,
            "quit" | "q" | "exit" => WizardCommand::Quit,
            _ => {
                return Err(SiteError::InvalidInput {
                    field: "command".to_string(),
                    value: line.to_string(),
                    reason: "Unknown command, type `help`".to_string(),
                })
            }
        };
        Ok(command)
    }
}

const HELP: &str = "\
commands:
  category <cafe|restaurant|office|retail>   업종 선택
  area <10..200>                             면적(평), 5평 단위
  option <flooring|lighting|hvac|furniture|signage>  옵션 토글
  next | back | show
  request                                    상담 신청서 열기
  name|phone|email|message <value>           신청서 입력
  submit | cancel | quit";

pub struct TerminalWizard<R, W> {
    input: R,
    output: W,
    wizard: EstimateWizard,
}

impl<R: BufRead, W: Write> TerminalWizard<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            wizard: EstimateWizard::new(),
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Runs until `quit`, end of input, or a successful submission.
    ///
    /// Without a repository the session is a dry run: `submit` validates the
    /// form and prints the estimate but nothing is stored.
    pub async fn run<L>(&mut self, repository: Option<&L>) -> Result<Option<Lead>>
    where
        L: LeadRepository + ?Sized,
    {
        writeln!(self.output, "{}", HELP)?;
        self.render()?;

        let mut line = String::new();
        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            if line.trim().is_empty() {
                continue;
            }

            let command = match WizardCommand::parse(&line) {
                Ok(command) => command,
                Err(e) => {
                    self.report(&e)?;
                    continue;
                }
            };

            match self.apply(command, repository).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => return Ok(None),
                Ok(Flow::Submitted(lead)) => return Ok(Some(lead)),
                Err(e @ SiteError::IoError(_)) => return Err(e),
                Err(e) => self.report(&e)?,
            }
        }
    }

    async fn apply<L>(&mut self, command: WizardCommand, repository: Option<&L>) -> Result<Flow>
    where
        L: LeadRepository + ?Sized,
    {
        match command {
            WizardCommand::Help => writeln!(self.output, "{}", HELP)?,
            WizardCommand::Category(category) => {
                self.wizard.select_category(category);
                self.render()?;
            }
            WizardCommand::Area(units) => {
                self.wizard.set_area_units(units)?;
                self.render()?;
            }
            WizardCommand::ToggleOption(option) => {
                self.wizard.toggle_option(option);
                self.render()?;
            }
            WizardCommand::Next => {
                self.wizard.next()?;
                self.render()?;
            }
            WizardCommand::Back => {
                self.wizard.back();
                self.render()?;
            }
            WizardCommand::Show => self.render()?,
            WizardCommand::Request => {
                self.wizard.open_contact()?;
                writeln!(
                    self.output,
                    "📝 상담 신청서: name / phone / email / message 입력 후 submit"
                )?;
            }
            WizardCommand::Name(value) => self.contact_field(|c| &mut c.name, value)?,
            WizardCommand::Phone(value) => self.contact_field(|c| &mut c.phone, value)?,
            WizardCommand::Email(value) => self.contact_field(|c| &mut c.email, value)?,
            WizardCommand::Message(value) => self.contact_field(|c| &mut c.message, value)?,
            WizardCommand::Cancel => {
                self.wizard.cancel_contact();
                writeln!(self.output, "신청서를 닫았습니다")?;
            }
            WizardCommand::Submit => return self.submit(repository).await,
            WizardCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    async fn submit<L>(&mut self, repository: Option<&L>) -> Result<Flow>
    where
        L: LeadRepository + ?Sized,
    {
        let Some(repository) = repository else {
            let contact = self
                .wizard
                .contact_mut()
                .cloned()
                .ok_or_else(|| SiteError::InvalidInput {
                    field: "contact".to_string(),
                    value: String::new(),
                    reason: "contact form is not open".to_string(),
                })?;
            crate::core::submission::validate_request(&contact, self.wizard.input())?;
            writeln!(
                self.output,
                "🧪 dry run: {} 님, 예상 견적 {} (저장하지 않음)",
                contact.name.trim(),
                self.wizard.estimate()
            )?;
            return Ok(Flow::Quit);
        };

        let lead = self.wizard.submit(repository).await?;
        writeln!(
            self.output,
            "✅ 상담 신청이 접수되었습니다. 빠른 시일 내에 연락드리겠습니다."
        )?;
        Ok(Flow::Submitted(lead))
    }

    fn contact_field<F>(&mut self, field: F, value: String) -> Result<()>
    where
        F: FnOnce(&mut crate::domain::model::ContactInfo) -> &mut String,
    {
        let contact = self
            .wizard
            .contact_mut()
            .ok_or_else(|| SiteError::InvalidInput {
                field: "contact".to_string(),
                value: value.clone(),
                reason: "Open the form with `request` first".to_string(),
            })?;
        *field(contact) = value;
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let step = self.wizard.step();
        let input = self.wizard.input().clone();
        match step {
            WizardStep::SelectCategory => {
                writeln!(self.output, "[1/3] 업종을 선택하세요")?;
                for category in BusinessCategory::ALL {
                    let mark = if input.category == Some(category) { "*" } else { " " };
                    writeln!(
                        self.output,
                        " {} {:<10} {} (평당 {}만원)",
                        mark,
                        category.key(),
                        category.label(),
                        category.base_rate()
                    )?;
                }
            }
            WizardStep::SelectArea => {
                writeln!(
                    self.output,
                    "[2/3] 면적: {} ({}㎡), {}~{}평",
                    input.area,
                    input.area.square_meters(),
                    AreaUnits::MIN,
                    AreaUnits::MAX
                )?;
            }
            WizardStep::SelectOptions => {
                writeln!(self.output, "[3/3] 추가 옵션")?;
                for option in EstimateOption::ALL {
                    let mark = if input.options.is_selected(option) { "x" } else { " " };
                    writeln!(
                        self.output,
                        " [{}] {:<10} {} (+{}만원/평)",
                        mark,
                        option.key(),
                        option.label(),
                        option.surcharge()
                    )?;
                }
            }
        }

        let summary = self.wizard.summary();
        match summary.estimate {
            Some(result) => writeln!(self.output, "💰 예상 견적: {}", result)?,
            None => writeln!(self.output, "💰 업종을 선택하면 견적이 표시됩니다")?,
        }
        Ok(())
    }

    fn report(&mut self, error: &SiteError) -> Result<()> {
        tracing::debug!("wizard command rejected: {}", error);
        writeln!(self.output, "❌ {}", error.user_friendly_message())?;
        Ok(())
    }
}

enum Flow {
    Continue,
    Quit,
    Submitted(Lead),
}
