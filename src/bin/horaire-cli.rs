#![forbid(unsafe_code)]
use anyhow::{anyhow, Result};
use chrono::{NaiveDate, NaiveTime};
use horaire::{
    io,
    model::{CalendarDayId, ClassroomId, OverrideId, SchoolId, SlotId, SubjectId, UserId},
    CalendarPatch, DayStatus, JsonStorage, NewSlot, OverrideRequest, Planner, SlotPatch,
    SweepOptions, SweepOutcome, Sweeper, TimetableOptions, User, UserRole, Weekday,
};
use clap::{Parser, Subcommand};
use mockable::DefaultClock;
use std::sync::Arc;
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI d'emploi du temps scolaire (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON du registre
    #[arg(long, global = true, default_value = "school.json")]
    data: String,

    /// Dernière heure de cours autorisée
    #[arg(long, global = true)]
    max_period: Option<u32>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ajouter un établissement
    AddSchool {
        #[arg(long)]
        name: String,
    },

    /// Ajouter une classe
    AddClassroom {
        #[arg(long)]
        school: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        section: Option<String>,
    },

    /// Ajouter une matière
    AddSubject {
        #[arg(long)]
        name: String,
    },

    /// Ajouter un utilisateur
    AddUser {
        #[arg(long)]
        handle: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "TEACHER")]
        role: UserRole,
    },

    /// Importer des utilisateurs depuis un CSV
    ImportUsers {
        #[arg(long)]
        csv: String,
    },

    /// Habiliter un enseignant pour (classe, matière)
    Authorize {
        #[arg(long)]
        classroom: String,
        #[arg(long)]
        subject: String,
        /// handle ou id
        #[arg(long)]
        teacher: String,
    },

    /// Créer un créneau
    CreateSlot {
        #[arg(long)]
        classroom: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        teacher: Option<String>,
        /// MON..SAT
        #[arg(long)]
        day: Weekday,
        #[arg(long)]
        period: u32,
    },

    /// Modifier un créneau (champs absents conservés)
    UpdateSlot {
        #[arg(long)]
        id: String,
        #[arg(long)]
        classroom: Option<String>,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        teacher: Option<String>,
        #[arg(long)]
        day: Option<Weekday>,
        #[arg(long)]
        period: Option<u32>,
    },

    /// Supprimer un créneau
    DeleteSlot {
        #[arg(long)]
        id: String,
    },

    /// Grille d'une classe (toute la grille sans `--classroom`)
    Timetable {
        #[arg(long)]
        classroom: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Enseignants habilités pour (classe, matière)
    Teachers {
        #[arg(long)]
        classroom: String,
        #[arg(long)]
        subject: String,
    },

    /// Créer ou modifier un remplacement
    Substitute {
        /// id existant pour une mise à jour
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        slot: String,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        original: String,
        #[arg(long)]
        substitute: String,
        #[arg(long, default_value = "")]
        reason: String,
    },

    /// Enseignants libres à une date et une heure
    FreeTeachers {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        period: u32,
    },

    /// Lister les remplacements
    Substitutions {
        #[arg(long)]
        date: Option<NaiveDate>,
        /// remplaçant (handle ou id)
        #[arg(long)]
        teacher: Option<String>,
    },

    /// Supprimer un remplacement
    DeleteSubstitution {
        #[arg(long)]
        id: String,
    },

    /// Générer le calendrier d'un établissement
    GenerateCalendar {
        #[arg(long)]
        school: String,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        /// jour férié supplémentaire (répétable)
        #[arg(long = "holiday")]
        holidays: Vec<NaiveDate>,
        /// CSV `date[,label]`
        #[arg(long)]
        holidays_csv: Option<String>,
    },

    /// Ajouter une journée au calendrier
    AddCalendarDay {
        #[arg(long)]
        school: String,
        #[arg(long)]
        date: NaiveDate,
        /// WORKING | HOLIDAY | HALF_DAY
        #[arg(long)]
        status: DayStatus,
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Modifier une journée du calendrier
    UpdateCalendarDay {
        #[arg(long)]
        id: String,
        #[arg(long)]
        status: Option<DayStatus>,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        description: Option<String>,
    },

    /// Afficher le calendrier d'un établissement
    Calendar {
        #[arg(long)]
        school: String,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Vérifier la grille et les remplacements
    Check,

    /// Supprimer les remplacements échus
    Sweep {
        /// date de référence (défaut : aujourd'hui)
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Balayage quotidien jusqu'à Ctrl-C
    SweepDaemon {
        /// heure locale du balayage
        #[arg(long, default_value = "00:00:00")]
        at: NaiveTime,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let storage = JsonStorage::open(&cli.data)?;
    let planner = Planner::with_options(
        storage,
        TimetableOptions {
            max_period: cli.max_period,
        },
    );

    let code = match cli.cmd {
        Commands::AddSchool { name } => {
            let id = planner.write(|r| r.add_school(&name))?;
            println!("{id}");
            0
        }
        Commands::AddClassroom {
            school,
            name,
            section,
        } => {
            let school = SchoolId::new(school);
            let id = planner.write(|r| r.add_classroom(&school, &name, section.as_deref()))?;
            println!("{id}");
            0
        }
        Commands::AddSubject { name } => {
            let id = planner.write(|r| r.add_subject(&name))?;
            println!("{id}");
            0
        }
        Commands::AddUser { handle, name, role } => {
            let id = planner.write(|r| r.add_user(User::new(handle, name, role)))?;
            println!("{id}");
            0
        }
        Commands::ImportUsers { csv } => {
            let users = io::import_users_csv(csv)?;
            let count = users.len();
            planner.write(|r| {
                for u in users {
                    r.add_user(u)?;
                }
                Ok(())
            })?;
            println!("{count} user(s) imported");
            0
        }
        Commands::Authorize {
            classroom,
            subject,
            teacher,
        } => {
            let teacher = resolve_user(&planner, &teacher)?;
            let id = planner.write(|r| {
                r.authorize(
                    &ClassroomId::new(&classroom),
                    &SubjectId::new(&subject),
                    &teacher,
                )
            })?;
            println!("{id}");
            0
        }
        Commands::CreateSlot {
            classroom,
            subject,
            teacher,
            day,
            period,
        } => {
            let teacher = teacher.map(|t| resolve_user(&planner, &t)).transpose()?;
            let slot = planner.create_slot(NewSlot {
                classroom: ClassroomId::new(classroom),
                subject: SubjectId::new(subject),
                teacher,
                weekday: day,
                period,
            })?;
            println!("{}", slot.id);
            0
        }
        Commands::UpdateSlot {
            id,
            classroom,
            subject,
            teacher,
            day,
            period,
        } => {
            let teacher = teacher.map(|t| resolve_user(&planner, &t)).transpose()?;
            let patch = SlotPatch {
                classroom: classroom.map(ClassroomId::new),
                subject: subject.map(SubjectId::new),
                weekday: day,
                period,
                teacher,
            };
            let slot = planner.update_slot(&SlotId::new(id), patch)?;
            println!("{} | {} {}", slot.id, slot.weekday, slot.period);
            0
        }
        Commands::DeleteSlot { id } => {
            planner.delete_slot(&SlotId::new(id))?;
            0
        }
        Commands::Timetable { classroom, out_csv } => {
            let slots = match classroom {
                Some(c) => planner.list_slots_by_classroom(&ClassroomId::new(c))?,
                None => planner.list_slots()?,
            };
            let registry = planner.read(|r| Ok(r.clone()))?;
            if let Some(path) = out_csv {
                io::export_timetable_csv(path, &registry, &slots)?;
            }
            for s in &slots {
                let teacher = s
                    .teacher
                    .as_ref()
                    .and_then(|id| registry.find_user(id).ok())
                    .map(|u| u.handle.as_str())
                    .unwrap_or("-");
                let subject = registry
                    .find_subject(&s.subject)
                    .map(|x| x.name.as_str())
                    .unwrap_or("?");
                println!("{} | {} {} | {} | {}", s.id, s.weekday, s.period, subject, teacher);
            }
            0
        }
        Commands::Teachers { classroom, subject } => {
            let teachers = planner
                .list_teachers_authorized_for(&ClassroomId::new(classroom), &SubjectId::new(subject))?;
            for t in &teachers {
                println!("{} | {}", t.handle, t.display_name);
            }
            0
        }
        Commands::Substitute {
            id,
            slot,
            date,
            original,
            substitute,
            reason,
        } => {
            let req = OverrideRequest {
                id: id.map(OverrideId::new),
                slot: SlotId::new(slot),
                date,
                original_teacher: resolve_user(&planner, &original)?,
                substitute_teacher: resolve_user(&planner, &substitute)?,
                reason,
            };
            let saved = planner.save_override(req)?;
            println!("{}", saved.id);
            0
        }
        Commands::FreeTeachers { date, period } => {
            for t in planner.find_free_teachers(date, period)? {
                println!("{} | {}", t.handle, t.display_name);
            }
            0
        }
        Commands::Substitutions { date, teacher } => {
            let list = match (date, teacher) {
                (Some(date), _) => planner.substitutions_by_date(date)?,
                (None, Some(t)) => {
                    let teacher = resolve_user(&planner, &t)?;
                    planner.substitutions_by_substitute(&teacher)?
                }
                (None, None) => planner.list_overrides()?,
            };
            for o in &list {
                println!(
                    "{} | {} | slot {} | {} → {} | {}",
                    o.id, o.date, o.slot, o.original_teacher, o.substitute_teacher, o.reason
                );
            }
            0
        }
        Commands::DeleteSubstitution { id } => {
            planner.delete_override(&OverrideId::new(id))?;
            0
        }
        Commands::GenerateCalendar {
            school,
            start,
            end,
            mut holidays,
            holidays_csv,
        } => {
            if let Some(path) = holidays_csv {
                holidays.extend(io::import_holidays_csv(path)?);
            }
            let report =
                planner.generate_calendar(&SchoolId::new(school), start, end, &holidays)?;
            println!("created {} | skipped {}", report.created, report.skipped);
            0
        }
        Commands::AddCalendarDay {
            school,
            date,
            status,
            description,
        } => {
            let day =
                planner.create_calendar_entry(&SchoolId::new(school), date, status, &description)?;
            println!("{}", day.id);
            0
        }
        Commands::UpdateCalendarDay {
            id,
            status,
            date,
            description,
        } => {
            let patch = CalendarPatch {
                status,
                description,
                date,
            };
            let day = planner.update_calendar_entry(&CalendarDayId::new(id), patch)?;
            println!("{} | {} | {}", day.date, day.status, day.description);
            0
        }
        Commands::Calendar { school, out_csv } => {
            let days = planner.calendar_by_school(&SchoolId::new(school))?;
            if let Some(path) = out_csv {
                io::export_calendar_csv(path, &days)?;
            }
            for d in &days {
                println!("{} | {} | {}", d.date, d.status, d.description);
            }
            0
        }
        Commands::Check => {
            let audit = planner.audit()?;
            if audit.is_clean() {
                println!("OK: no conflicts");
                0
            } else {
                for c in &audit.conflicts {
                    eprintln!(
                        "conflict {:?}: teacher {} slot {} {}",
                        c.kind,
                        c.teacher,
                        c.slot_a,
                        c.slot_b.as_ref().map(SlotId::as_str).unwrap_or("")
                    );
                }
                for w in &audit.warnings {
                    eprintln!(
                        "warning {:?}: substitution {} {}",
                        w.kind,
                        w.substitution,
                        w.other.as_ref().map(OverrideId::as_str).unwrap_or("")
                    );
                }
                eprintln!(
                    "Found {} conflict(s), {} warning(s)",
                    audit.conflicts.len(),
                    audit.warnings.len()
                );
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
        Commands::Sweep { today: Some(today) } => {
            let removed = planner.sweep_expired(today)?;
            println!("{removed} expired substitution(s) removed");
            0
        }
        Commands::Sweep { today: None } => {
            let sweeper = Sweeper::new(
                Arc::new(planner),
                Arc::new(DefaultClock),
                SweepOptions::default(),
            );
            match sweeper.sweep_now()? {
                SweepOutcome::Completed { today, removed } => {
                    println!("{removed} expired substitution(s) removed ({today})");
                }
                SweepOutcome::AlreadyRunning => println!("sweep already running"),
            }
            0
        }
        Commands::SweepDaemon { at } => {
            let sweeper = Arc::new(Sweeper::new(
                Arc::new(planner),
                Arc::new(DefaultClock),
                SweepOptions { run_at: at },
            ));
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(async {
                let handle = sweeper.spawn();
                tokio::signal::ctrl_c().await?;
                handle.abort();
                Ok::<_, anyhow::Error>(())
            })?;
            0
        }
    };

    std::process::exit(code);
}

/// Résout un utilisateur par handle, à défaut par id.
fn resolve_user(planner: &Planner<JsonStorage>, key: &str) -> Result<UserId> {
    planner
        .read(|r| {
            Ok(r.find_user_by_handle(key)
                .map(|u| u.id.clone())
                .or_else(|| r.find_user(&UserId::new(key)).ok().map(|u| u.id.clone())))
        })?
        .ok_or_else(|| anyhow!("unknown user: {key}"))
}
